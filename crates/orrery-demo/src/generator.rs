//! Random planetary system generation.

use crossbeam_channel::Receiver;
use orrery_config::GeneratorConfig;
use orrery_kepler::{KeplerError, periapsis_from_semi_major_axis, period_from_gravitational_parameter};
use orrery_sim::{
    Body, EndingPolicy, KeplerSolver, Motion, OrbitDecay, OrbitElements, OrbitEvent, OrbitState,
    RotationElements, RotationState,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use tracing::debug;

/// What a body is, for logging and parent lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    Planet,
    Moon { parent: u64 },
    Comet,
}

/// Bookkeeping kept on the owning thread while the body itself is in the pool.
#[derive(Debug)]
pub struct BodyInfo {
    pub name: String,
    pub kind: Kind,
    pub events: Receiver<OrbitEvent>,
}

/// A generated system: bodies in id order, with matching info.
#[derive(Debug, Default)]
pub struct System {
    pub bodies: Vec<Body>,
    pub info: Vec<BodyInfo>,
}

impl System {
    fn push(&mut self, mut body: Body, name: String, kind: Kind) {
        let events = body.motion.orbit_mut().subscribe();
        debug!(id = body.id, %name, "generated body");
        self.bodies.push(body);
        self.info.push(BodyInfo { name, kind, events });
    }

    fn next_id(&self) -> u64 {
        self.bodies.len() as u64
    }
}

/// Uniform sample from an inclusive `[min, max]` range, in either order.
fn sample(rng: &mut impl Rng, [a, b]: [f64; 2]) -> f64 {
    if a == b {
        a
    } else {
        rng.gen_range(a.min(b)..=a.max(b))
    }
}

fn sample_count(rng: &mut impl Rng, [a, b]: [u32; 2]) -> u32 {
    rng.gen_range(a.min(b)..=a.max(b))
}

/// Builds planets with moons, plus comets, from `config`.
///
/// Bodies are created stopped, with `time_scale` applied.
pub fn generate_system(
    config: &GeneratorConfig,
    solver: KeplerSolver,
    time_scale: f64,
) -> Result<System, KeplerError> {
    let mut rng = Xoshiro256StarStar::seed_from_u64(config.seed);
    let mut system = System::default();

    let planets = sample_count(&mut rng, config.planet_count);
    for i in 0..planets {
        let id = system.next_id();
        let orbit = bound_orbit(&mut rng, config, config.planet_axis_range, solver, time_scale)?;
        let motion = if config.planet_decay != 0.0 || config.planet_precession != 0.0 {
            Motion::Decaying(OrbitDecay::new(
                orbit,
                config.planet_decay,
                config.planet_precession,
            )?)
        } else {
            Motion::Orbit(orbit)
        };
        let rotation = random_rotation(&mut rng, config, time_scale)?;
        system.push(
            Body::new(id, motion, Some(rotation)),
            format!("planet {i}"),
            Kind::Planet,
        );

        let moons = sample_count(&mut rng, config.moon_count);
        for j in 0..moons {
            let moon_id = system.next_id();
            let orbit = bound_orbit(&mut rng, config, config.moon_axis_range, solver, time_scale)?;
            let rotation = random_rotation(&mut rng, config, time_scale)?;
            system.push(
                Body::new(moon_id, Motion::Orbit(orbit), Some(rotation)),
                format!("moon {i}.{j}"),
                Kind::Moon { parent: id },
            );
        }
    }

    for k in 0..config.comets.count {
        let id = system.next_id();
        let orbit = comet_orbit(&mut rng, config, solver, time_scale)?;
        system.push(
            Body::new(id, Motion::Orbit(orbit), None),
            format!("comet {k}"),
            Kind::Comet,
        );
    }

    Ok(system)
}

fn bound_orbit(
    rng: &mut impl Rng,
    config: &GeneratorConfig,
    axis_range: [f64; 2],
    solver: KeplerSolver,
    time_scale: f64,
) -> Result<OrbitState, KeplerError> {
    let semi_major_axis = sample(rng, axis_range);
    let eccentricity = sample(rng, config.eccentricity_range);
    let elements = OrbitElements {
        periapsis: periapsis_from_semi_major_axis(semi_major_axis, eccentricity)?,
        eccentricity,
        inclination: sample(rng, config.inclination_range),
        longitude: sample(rng, config.longitude_range),
        argument: sample(rng, config.argument_range),
        period: period_from_gravitational_parameter(
            semi_major_axis,
            config.gravitational_parameter,
        ),
        mean_anomaly: sample(rng, [-180.0, 180.0]),
        time_scale,
        ..Default::default()
    };
    OrbitState::with_solver(elements, solver)
}

/// Open orbit making a single pass and deactivating at the far limit.
fn comet_orbit(
    rng: &mut impl Rng,
    config: &GeneratorConfig,
    solver: KeplerSolver,
    time_scale: f64,
) -> Result<OrbitState, KeplerError> {
    let comets = &config.comets;
    let elements = OrbitElements {
        periapsis: sample(rng, comets.periapsis_range),
        eccentricity: sample(rng, comets.eccentricity_range),
        period: sample(rng, comets.period_range),
        limits: [-360.0, 360.0],
        mean_anomaly: -360.0,
        longitude: sample(rng, [-180.0, 180.0]),
        inclination: sample(rng, [-180.0, 180.0]),
        argument: sample(rng, [-180.0, 180.0]),
        time_scale,
        ending: EndingPolicy::ClampAndDeactivate,
        ..Default::default()
    };
    OrbitState::with_solver(elements, solver)
}

fn random_rotation(
    rng: &mut impl Rng,
    config: &GeneratorConfig,
    time_scale: f64,
) -> Result<RotationState, KeplerError> {
    RotationState::new(RotationElements {
        right_ascension: sample(rng, [-180.0, 180.0]),
        declination: sample(rng, config.declination_range),
        mean_angle: sample(rng, [-180.0, 180.0]),
        period: sample(rng, config.rotation_period_range),
        time_scale,
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config(seed: u64) -> GeneratorConfig {
        GeneratorConfig {
            seed,
            planet_count: [2, 4],
            moon_count: [0, 2],
            ..Default::default()
        }
    }

    #[test]
    fn test_same_seed_same_system() {
        let a = generate_system(&small_config(5), KeplerSolver::default(), 1.0).unwrap();
        let b = generate_system(&small_config(5), KeplerSolver::default(), 1.0).unwrap();
        assert_eq!(a.bodies.len(), b.bodies.len());
        for (x, y) in a.bodies.iter().zip(&b.bodies) {
            assert_eq!(x.orbit().elements(), y.orbit().elements());
            assert_eq!(x.orbit().position(), y.orbit().position());
        }
    }

    #[test]
    fn test_counts_within_ranges() {
        let system = generate_system(&small_config(11), KeplerSolver::default(), 1.0).unwrap();
        let planets = system.info.iter().filter(|i| i.kind == Kind::Planet).count();
        let comets = system.info.iter().filter(|i| i.kind == Kind::Comet).count();
        assert!((2..=4).contains(&planets));
        assert_eq!(comets, 3);
        assert_eq!(system.bodies.len(), system.info.len());
        for (index, body) in system.bodies.iter().enumerate() {
            assert_eq!(body.id, index as u64);
        }
    }

    #[test]
    fn test_moons_follow_their_planet() {
        let system = generate_system(&small_config(3), KeplerSolver::default(), 1.0).unwrap();
        for (index, info) in system.info.iter().enumerate() {
            if let Kind::Moon { parent } = info.kind {
                assert!(parent < index as u64);
                assert_eq!(system.info[parent as usize].kind, Kind::Planet);
            }
        }
    }

    #[test]
    fn test_planet_period_follows_third_law() {
        let config = small_config(8);
        let system = generate_system(&config, KeplerSolver::default(), 1.0).unwrap();
        let planet = &system.bodies[0];
        let a = planet.orbit().semi_major_axis();
        let expected = period_from_gravitational_parameter(a, config.gravitational_parameter);
        let period = planet.orbit().elements().period;
        assert!((period - expected).abs() / expected < 1e-9);
    }

    #[test]
    fn test_comets_start_at_lower_limit() {
        let system = generate_system(&small_config(1), KeplerSolver::default(), 1.0).unwrap();
        for (body, info) in system.bodies.iter().zip(&system.info) {
            if info.kind == Kind::Comet {
                let elements = body.orbit().elements();
                assert_eq!(elements.ending, EndingPolicy::ClampAndDeactivate);
                assert!((body.orbit().anomaly() + 2.0 * std::f64::consts::PI).abs() < 1e-12);
                assert!(body.rotation.is_none());
            }
        }
    }

    #[test]
    fn test_decay_applied_to_planets() {
        let config = GeneratorConfig {
            planet_decay: -0.01,
            ..small_config(2)
        };
        let system = generate_system(&config, KeplerSolver::default(), 1.0).unwrap();
        assert!(matches!(system.bodies[0].motion, Motion::Decaying(_)));
    }

    #[test]
    fn test_sample_handles_reversed_and_empty_ranges() {
        let mut rng = Xoshiro256StarStar::seed_from_u64(0);
        assert_eq!(sample(&mut rng, [2.0, 2.0]), 2.0);
        for _ in 0..100 {
            let x = sample(&mut rng, [5.0, -5.0]);
            assert!((-5.0..=5.0).contains(&x));
        }
    }
}
