/*
 * Pose Module
 *
 * The boundary between the simulation and whatever draws it. The flock only
 * produces plain poses (position + heading); a PoseSink consumes them once
 * per frame, in population order, after the update has completed.
 */

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    /// Heading in radians, counter-clockwise from +x.
    pub heading: f64,
}

pub trait PoseSink {
    fn set_pose(&mut self, slot: usize, pose: Pose);

    // Batch upload; defaults to one call per slot
    fn submit(&mut self, poses: &[Pose]) {
        for (slot, pose) in poses.iter().enumerate() {
            self.set_pose(slot, *pose);
        }
    }
}

impl PoseSink for Vec<Pose> {
    fn set_pose(&mut self, slot: usize, pose: Pose) {
        if slot >= self.len() {
            self.resize(slot + 1, Pose::default());
        }
        self[slot] = pose;
    }

    fn submit(&mut self, poses: &[Pose]) {
        self.clear();
        self.extend_from_slice(poses);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Records individual calls to check the default batch path
    #[derive(Default)]
    struct CallLog(Vec<(usize, Pose)>);

    impl PoseSink for CallLog {
        fn set_pose(&mut self, slot: usize, pose: Pose) {
            self.0.push((slot, pose));
        }
    }

    #[test]
    fn default_submit_calls_set_pose_in_order() {
        let poses = [
            Pose { x: 1.0, y: 2.0, heading: 0.5 },
            Pose { x: 3.0, y: 4.0, heading: -0.5 },
        ];
        let mut log = CallLog::default();
        log.submit(&poses);
        assert_eq!(log.0, vec![(0, poses[0]), (1, poses[1])]);
    }

    #[test]
    fn vec_sink_replaces_its_contents() {
        let mut sink = vec![Pose::default(); 5];
        sink.submit(&[Pose { x: 1.0, y: 1.0, heading: 0.0 }]);
        assert_eq!(sink.len(), 1);

        sink.set_pose(2, Pose { x: 9.0, y: 0.0, heading: 0.0 });
        assert_eq!(sink.len(), 3);
        assert_eq!(sink[2].x, 9.0);
    }
}
