//! Lateral sector monitoring
//!
//! While the car drives past a row of obstacles the monitor follows the
//! viability of the sector beside it. Each change of viability is an edge,
//! and the odometry at each edge is marked so that the distance between two
//! edges (the length of a gap or of an obstacle) can be measured.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

use serde::Serialize;

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Direction of travel, selecting which sensors make up the sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TravelDirection {
    /// Front side and middle side sensors.
    Forward,

    /// Rear corner and rear sensors.
    Reverse,
}

/// A change in sector viability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum SectorEdge {
    /// The sector became viable, the car is passing the start of a gap.
    GapOpened,

    /// The sector stopped being viable, the car is passing the end of a gap.
    GapClosed,
}

/// A change to the monitoring session requested by a consumer of the hub.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MonitorAction {
    /// Leave monitoring as it is.
    None,

    /// Start a new monitoring session for the given direction.
    Start(TravelDirection),

    /// End monitoring and discard its measurements.
    Reset,
}

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// Monitoring session state.
#[derive(Debug, Clone, Default)]
pub struct SectorMonitor {
    direction: TravelDirection,

    active: bool,

    /// Viability on the last sample, `None` until the first sample.
    viable: Option<bool>,

    /// Edge detected on the last sample.
    edge: Option<SectorEdge>,

    /// Odometry at which the current (or last) gap opened.
    sector_start_cm: Option<u64>,

    /// Odometry at which the last gap closed.
    sector_end_cm: Option<u64>,

    last_mark_cm: Option<u64>,
    prev_mark_cm: Option<u64>,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Default for TravelDirection {
    fn default() -> Self {
        TravelDirection::Forward
    }
}

impl SectorMonitor {
    /// Start a new session, discarding any previous one.
    ///
    /// The starting odometry counts as the first mark.
    pub fn start(&mut self, direction: TravelDirection, odometry_cm: u64) {
        *self = Self {
            direction,
            active: true,
            last_mark_cm: Some(odometry_cm),
            ..Self::default()
        };
    }

    /// End the session and discard its measurements.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Feed one sample of sector viability at the given odometry.
    pub fn sample(&mut self, viable: bool, odometry_cm: u64) {
        if !self.active {
            return;
        }

        self.edge = match self.viable {
            Some(false) if viable => Some(SectorEdge::GapOpened),
            Some(true) if !viable => Some(SectorEdge::GapClosed),
            _ => None,
        };

        match self.edge {
            Some(SectorEdge::GapOpened) => {
                self.sector_start_cm = Some(odometry_cm);
                self.sector_end_cm = None;
                self.mark(odometry_cm);
            }
            Some(SectorEdge::GapClosed) => {
                self.sector_end_cm = Some(odometry_cm);
                self.mark(odometry_cm);
            }
            None => {
                // A session which starts beside a gap is inside it already
                if self.viable.is_none() && viable {
                    self.sector_start_cm = Some(odometry_cm);
                }
            }
        }

        self.viable = Some(viable);
    }

    /// Forget the edge of the last sample, keeping the marks.
    pub fn clear_edge(&mut self) {
        self.edge = None;
    }

    fn mark(&mut self, odometry_cm: u64) {
        self.prev_mark_cm = self.last_mark_cm;
        self.last_mark_cm = Some(odometry_cm);
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn direction(&self) -> TravelDirection {
        self.direction
    }

    pub fn edge(&self) -> Option<SectorEdge> {
        self.edge
    }

    pub fn sector_start_cm(&self) -> Option<u64> {
        self.sector_start_cm
    }

    pub fn sector_end_cm(&self) -> Option<u64> {
        self.sector_end_cm
    }

    /// Distance between the last two marks.
    pub fn displacement_cm(&self) -> Option<i64> {
        match (self.prev_mark_cm, self.last_mark_cm) {
            (Some(prev), Some(last)) => Some(last as i64 - prev as i64),
            _ => None,
        }
    }

    /// Returns true if the sector has been viable on every sample since the
    /// gap opened and the car has travelled at least `min_distance_cm` since.
    pub fn is_clear(&self, odometry_cm: u64, min_distance_cm: u64) -> bool {
        if !self.active || self.viable != Some(true) {
            return false;
        }

        match self.sector_start_cm {
            Some(start) => odometry_cm.saturating_sub(start) >= min_distance_cm,
            None => false,
        }
    }

    /// Length of the current gap if it is still open, otherwise of the last
    /// closed gap.
    pub fn gap_length_cm(&self, odometry_cm: u64) -> Option<u64> {
        let start = self.sector_start_cm?;

        match self.sector_end_cm {
            Some(end) => Some(end.saturating_sub(start)),
            None if self.viable == Some(true) => Some(odometry_cm.saturating_sub(start)),
            None => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_edges_and_displacement() {
        let mut mon = SectorMonitor::default();
        mon.start(TravelDirection::Forward, 0);

        let viable = [true, true, true, false, true, true];
        let odometry = [0u64, 10, 20, 30, 55, 60];
        let mut edges = vec![];

        for i in 0..viable.len() {
            mon.sample(viable[i], odometry[i]);
            if let Some(e) = mon.edge() {
                edges.push((i, e));
            }
        }

        assert_eq!(
            edges,
            vec![(3, SectorEdge::GapClosed), (4, SectorEdge::GapOpened)]
        );
        assert_eq!(mon.displacement_cm(), Some(25));
        assert_eq!(mon.sector_start_cm(), Some(55));
        assert_eq!(mon.sector_end_cm(), None);
        assert_eq!(mon.gap_length_cm(60), Some(5));
    }

    #[test]
    fn test_clear_requires_continuity() {
        let mut mon = SectorMonitor::default();
        mon.start(TravelDirection::Forward, 100);

        mon.sample(true, 100);
        mon.sample(true, 130);
        assert!(!mon.is_clear(130, 40));
        mon.sample(true, 140);
        assert!(mon.is_clear(140, 40));

        // One non viable sample restarts the window
        mon.sample(false, 150);
        assert!(!mon.is_clear(150, 40));
        assert_eq!(mon.gap_length_cm(150), Some(50));
        mon.sample(true, 160);
        assert!(!mon.is_clear(190, 40));
        mon.sample(true, 200);
        assert!(mon.is_clear(200, 40));
    }

    #[test]
    fn test_clear_edge() {
        let mut mon = SectorMonitor::default();
        mon.start(TravelDirection::Forward, 0);
        mon.sample(true, 0);
        mon.sample(false, 35);
        assert_eq!(mon.edge(), Some(SectorEdge::GapClosed));

        mon.clear_edge();
        assert_eq!(mon.edge(), None);
        assert_eq!(mon.displacement_cm(), Some(35));
        assert_eq!(mon.gap_length_cm(35), Some(35));

        // The next sample still compares against the last viability
        mon.sample(true, 40);
        assert_eq!(mon.edge(), Some(SectorEdge::GapOpened));
    }

    #[test]
    fn test_inactive_and_reset() {
        let mut mon = SectorMonitor::default();
        mon.sample(true, 10);
        mon.sample(false, 20);
        assert_eq!(mon.edge(), None);
        assert!(!mon.is_clear(1000, 0));

        mon.start(TravelDirection::Reverse, 20);
        mon.sample(false, 20);
        mon.sample(true, 30);
        assert_eq!(mon.edge(), Some(SectorEdge::GapOpened));
        assert_eq!(mon.direction(), TravelDirection::Reverse);

        mon.reset();
        assert!(!mon.is_active());
        assert_eq!(mon.displacement_cm(), None);
        assert_eq!(mon.gap_length_cm(30), None);
    }
}
