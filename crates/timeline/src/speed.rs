use serde::{Deserialize, Serialize};

/// Behavior of a portal item. Only `Speed` portals affect the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PortalFunction {
    /// Changes traversal speed to the given value from the portal onward.
    Speed(f32),
    Mode,
    Gravity,
    Size,
}

impl PortalFunction {
    pub fn speed(self) -> Option<f32> {
        match self {
            Self::Speed(speed) => Some(speed),
            _ => None,
        }
    }
}

/// A point along the path from which traversal continues at `speed`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedMarker {
    pub distance: f32,
    pub speed: f32,
}

/// Errors from building a speed map.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SpeedError {
    #[error("initial speed must be positive, got {0}")]
    NonPositiveInitialSpeed(f32),
    #[error("speed marker at distance {distance} has non-positive speed {speed}")]
    NonPositiveMarkerSpeed { distance: f32, speed: f32 },
}

/// Piecewise-linear mapping between path distance and elapsed level time.
///
/// Markers are sorted by distance once on construction (stable, so markers
/// sharing a distance keep their placement order). Both conversions are linear
/// scans over the markers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedMap {
    initial_speed: f32,
    markers: Vec<SpeedMarker>,
}

impl SpeedMap {
    /// Build a map from an initial speed and markers in any order.
    pub fn new(
        initial_speed: f32,
        markers: impl IntoIterator<Item = SpeedMarker>,
    ) -> Result<Self, SpeedError> {
        if initial_speed.is_nan() || initial_speed <= 0.0 {
            return Err(SpeedError::NonPositiveInitialSpeed(initial_speed));
        }
        let mut markers: Vec<SpeedMarker> = markers.into_iter().collect();
        if let Some(bad) = markers.iter().find(|m| m.speed.is_nan() || m.speed <= 0.0) {
            return Err(SpeedError::NonPositiveMarkerSpeed {
                distance: bad.distance,
                speed: bad.speed,
            });
        }
        markers.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        tracing::debug!(initial_speed, markers = markers.len(), "speed map built");
        Ok(Self {
            initial_speed,
            markers,
        })
    }

    /// Build a map from portals in placement order, keeping only speed portals.
    pub fn from_portals(
        initial_speed: f32,
        portals: impl IntoIterator<Item = (f32, PortalFunction)>,
    ) -> Result<Self, SpeedError> {
        let markers = portals.into_iter().filter_map(|(distance, function)| {
            function.speed().map(|speed| SpeedMarker { distance, speed })
        });
        Self::new(initial_speed, markers)
    }

    /// A map with no markers: distance and time are related by `initial_speed`.
    pub fn constant(initial_speed: f32) -> Result<Self, SpeedError> {
        Self::new(initial_speed, [])
    }

    pub fn initial_speed(&self) -> f32 {
        self.initial_speed
    }

    /// Markers in ascending distance order.
    pub fn markers(&self) -> &[SpeedMarker] {
        &self.markers
    }

    /// Distance reached after `time` seconds of travel.
    pub fn time_to_distance(&self, time: f32) -> f32 {
        let mut current_time = 0.0;
        let mut distance = 0.0;
        let mut speed = self.initial_speed;
        for marker in &self.markers {
            let marker_time = current_time + (marker.distance - distance) / speed;
            if marker_time > time {
                break;
            }
            current_time = marker_time;
            distance = marker.distance;
            speed = marker.speed;
        }
        distance + (time - current_time) * speed
    }

    /// Time at which travel reaches `distance`.
    pub fn distance_to_time(&self, distance: f32) -> f32 {
        let mut current_distance = 0.0;
        let mut time = 0.0;
        let mut speed = self.initial_speed;
        for marker in &self.markers {
            if marker.distance > distance {
                break;
            }
            time += (marker.distance - current_distance) / speed;
            current_distance = marker.distance;
            speed = marker.speed;
        }
        time + (distance - current_distance) / speed
    }
}
