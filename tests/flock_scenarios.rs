// End-to-end flock scenarios: boundary containment, separation at close
// range, long-run numeric stability and reproducibility.

use flox::{Boid, Flock, FlockingParams, Pose, Vector2};

const DT: f64 = 1.0 / 30.0;
const EPS: f64 = 1e-9;

fn sequential() -> FlockingParams {
    FlockingParams {
        parallel: false,
        ..FlockingParams::default()
    }
}

#[test]
fn lone_boid_outside_the_bound_is_pulled_back() {
    let boid = Boid::new(0, Vector2::new(150.0, 0.0), Vector2::ZERO);
    let mut flock = Flock::from_boids(vec![boid], 100.0, FlockingParams::default()).unwrap();

    flock.update(DT);
    let acceleration = flock.boids()[0].acceleration;
    assert!(acceleration.x < 0.0, "expected a pull towards the origin, got {acceleration:?}");
    assert_eq!(acceleration.y, 0.0);
    // seek is limited to max_force, then softened by 1.5
    assert!((acceleration.x + Boid::MAX_FORCE / 1.5).abs() < EPS);

    let mut entered_at = None;
    for step in 0..300 {
        flock.update(DT);
        if flock.boids()[0].position.magnitude() < 100.0 {
            entered_at = Some(step);
            break;
        }
    }
    assert!(entered_at.is_some(), "boid never came back inside the bound");

    // afterwards it keeps swinging back through the bound without escaping
    let mut last_inside = 0;
    for step in 0..3000 {
        flock.update(DT);
        let distance = flock.boids()[0].position.magnitude();
        assert!(distance < 300.0, "boid escaped to {distance} at step {step}");
        if distance < 100.0 {
            last_inside = step;
        }
        assert!(step - last_inside < 400, "boid stayed outside since step {last_inside}");
    }
}

#[test]
fn close_stationary_boids_push_apart() {
    let boids = vec![
        Boid::new(0, Vector2::new(-5.0, 0.0), Vector2::ZERO),
        Boid::new(1, Vector2::new(5.0, 0.0), Vector2::ZERO),
    ];

    let left = boids[0];
    let right = boids[1];
    let separation = left.separation(&[&right]);
    assert!(separation.x < 0.0 && separation.y.abs() < EPS);
    let separation = right.separation(&[&left]);
    assert!(separation.x > 0.0 && separation.y.abs() < EPS);

    let mut flock = Flock::from_boids(boids, 1000.0, FlockingParams::default()).unwrap();
    flock.update(DT);

    let a = flock.boids()[0].acceleration;
    let b = flock.boids()[1].acceleration;
    assert!(a.x < 0.0, "left boid should be pushed left, got {a:?}");
    assert!(b.x > 0.0, "right boid should be pushed right, got {b:?}");
    // separation (10 / 2) outweighs cohesion (10 / 16)
    assert!((a.x + 5.0 - 0.625).abs() < EPS);
    assert!((b.x - 5.0 + 0.625).abs() < EPS);

    flock.update(DT);
    let gap = flock.boids()[0].position.distance_to(&flock.boids()[1].position);
    assert!(gap > 10.0, "boids moved closer: {gap}");
}

#[test]
fn long_run_stays_finite() {
    let mut flock = Flock::seeded(50, Vector2::ZERO, 240.0, FlockingParams::default(), 2024).unwrap();
    for _ in 0..10_000 {
        flock.update(DT);
    }
    for boid in flock.boids() {
        assert!(boid.position.is_finite(), "{boid:?}");
        assert!(boid.velocity.is_finite(), "{boid:?}");
        assert!(boid.acceleration.is_finite(), "{boid:?}");
    }
    let mut poses: Vec<Pose> = Vec::new();
    flock.draw(&mut poses);
    assert!(poses.iter().all(|p| p.x.is_finite() && p.y.is_finite() && p.heading.is_finite()));
}

#[test]
fn coincident_boids_stay_finite() {
    let boids = (0..4)
        .map(|id| Boid::new(id, Vector2::new(10.0, 10.0), Vector2::ZERO))
        .collect();
    let mut flock = Flock::from_boids(boids, 100.0, FlockingParams::default()).unwrap();
    for _ in 0..100 {
        flock.update(DT);
    }
    assert!(flock.boids().iter().all(|b| b.position.is_finite() && b.velocity.is_finite()));
}

#[test]
fn seeded_runs_are_bit_identical() {
    let run = || {
        let mut flock = Flock::seeded(40, Vector2::new(10.0, -20.0), 200.0, FlockingParams::default(), 77).unwrap();
        for step in 0..500 {
            flock.update(DT + (step % 3) as f64 * 0.001);
        }
        flock.boids().to_vec()
    };
    assert_eq!(run(), run());
}

#[test]
fn parallel_and_sequential_updates_agree() {
    let mut parallel = Flock::seeded(60, Vector2::ZERO, 200.0, FlockingParams::default(), 5).unwrap();
    let mut single = Flock::seeded(60, Vector2::ZERO, 200.0, sequential(), 5).unwrap();
    assert_eq!(parallel.boids(), single.boids());

    for _ in 0..300 {
        parallel.update(DT);
        single.update(DT);
    }
    assert_eq!(parallel.boids(), single.boids());
    assert_eq!(parallel.poses(), single.poses());
}

#[test]
fn flock_gathers_into_neighborhoods() {
    let mut flock = Flock::seeded(50, Vector2::ZERO, 240.0, FlockingParams::default(), 8).unwrap();
    for _ in 0..1_500 {
        flock.update(DT);
    }
    // cruise control keeps everyone near max speed
    let stats = flock.stats();
    assert!((stats.mean_speed - Boid::MAX_SPEED).abs() < 25.0, "{stats:?}");

    let params = flock.params();
    let align_sq = params.align_range * params.align_range;
    let with_neighbors = (0..flock.len())
        .filter(|&i| (0..flock.len()).any(|j| j != i && flock.distances().get(i, j) < align_sq))
        .count();
    assert!(with_neighbors > flock.len() / 2, "only {with_neighbors} boids have neighbors");
}
