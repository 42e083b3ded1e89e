use geo_types::Point;
use serde::{Deserialize, Serialize};

const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl From<Coordinates> for Point<f64> {
    fn from(coordinates: Coordinates) -> Self {
        Point::new(coordinates.lng, coordinates.lat)
    }
}

impl From<Coordinates> for String {
    fn from(coordinates: Coordinates) -> Self {
        format!("{},{}", coordinates.lat, coordinates.lng)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Distance {
    pub origin: Coordinates,
    pub destination: Coordinates,
    pub kilometers: f64,
}

impl Distance {
    pub fn new(origin: Coordinates, destination: Coordinates) -> Self {
        Self {
            origin,
            destination,
            kilometers: distance_km(origin, destination),
        }
    }
}

/// Great-circle distance in kilometers, rounded to one decimal.
pub fn distance_km(origin: Coordinates, destination: Coordinates) -> f64 {
    let a: Point<f64> = origin.into();
    let b: Point<f64> = destination.into();

    let (lat1, lng1) = (a.y().to_radians(), a.x().to_radians());
    let (lat2, lng2) = (b.y().to_radians(), b.x().to_radians());

    let sin_dlat = ((lat2 - lat1) * 0.5).sin();
    let sin_dlng = ((lng2 - lng1) * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlng * sin_dlng;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    (EARTH_RADIUS_KM * c * 10.0).round() / 10.0
}

#[test]
fn distance_across_bengaluru() {
    let pickup = Coordinates {
        lat: 12.9716,
        lng: 77.5946,
    };
    let destination = Coordinates {
        lat: 12.9352,
        lng: 77.6146,
    };

    assert_eq!(distance_km(pickup, destination), 4.6);
    assert_eq!(distance_km(destination, pickup), 4.6);
}

#[test]
fn distance_to_self_is_zero() {
    let point = Coordinates {
        lat: 19.076,
        lng: 72.8777,
    };

    assert_eq!(distance_km(point, point), 0.0);
    assert_eq!(Distance::new(point, point).kilometers, 0.0);
}

#[test]
fn coordinates_format_as_lat_lng() {
    let location: String = Coordinates { lat: 1.5, lng: -2.25 }.into();
    assert_eq!(location, "1.5,-2.25");
}
