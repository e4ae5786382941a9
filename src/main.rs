//! Recoil Sim - native demo driver
//!
//! Fires one full-auto burst against an in-memory orientation and logs the
//! camera path: kick, recovery delay, spring-back.
//!
//! Usage: `recoil-sim [preset] [shots] [pattern.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use std::sync::Arc;

    use recoil_sim::consts::{MAX_SUBSTEPS, SIM_DT};
    use recoil_sim::{RecoilPattern, Rotation, Settings, WeaponPreset};

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let preset = match args.first() {
        Some(name) => WeaponPreset::from_str(name).unwrap_or_else(|| {
            log::warn!("Unknown preset '{}', using Rifle", name);
            WeaponPreset::Rifle
        }),
        None => WeaponPreset::Rifle,
    };
    let shots: u32 = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(15);

    let pattern = match args.get(2) {
        Some(path) => match RecoilPattern::load(path) {
            Ok(pattern) => pattern,
            Err(e) => {
                log::error!("Failed to load pattern {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => preset.pattern(),
    };

    let mut settings = Settings::from_preset(preset);
    settings.seed = Some(0x5eed);
    let mut weapon = settings.build_engine(Arc::new(pattern));

    log::info!(
        "Recoil Sim: {} x{} at {} rpm",
        preset.as_str(),
        shots,
        preset.fire_rate_rpm()
    );

    let mut view = Rotation::ZERO;
    let fire_interval = preset.fire_interval() as f64;
    let dt = SIM_DT;
    let mut now = 0.0f64;
    let mut fired = 0u32;
    let mut next_shot = 0.0f64;
    let mut peak = view;

    weapon.start_sequence();

    // Host frames at 60 Hz, stepped at the fixed sim rate
    let frame = 1.0 / 60.0;
    let end = fire_interval * shots as f64 + 3.0;
    while now < end {
        let mut accumulator = frame;
        let mut substeps = 0;
        while accumulator >= dt as f64 * 0.999 && substeps < MAX_SUBSTEPS {
            if fired < shots && now >= next_shot {
                let spread = weapon.spread_angle();
                let kick = weapon.apply_shot(now);
                fired += 1;
                next_shot += fire_interval;
                log::info!(
                    "shot {:>2}  kick ({:+.2}, {:+.2})  spread {:.2}  view ({:+.2}, {:+.2})",
                    fired,
                    kick.x,
                    kick.y,
                    spread,
                    view.pitch,
                    view.yaw
                );
            }

            weapon.advance(dt, now, &mut view);
            if view.pitch > peak.pitch {
                peak = view;
            }
            now += dt as f64;
            accumulator -= dt as f64;
            substeps += 1;
        }
    }

    log::info!(
        "Peak ({:+.2}, {:+.2}), final ({:+.3}, {:+.3}), heat {:.1}, active {}",
        peak.pitch,
        peak.yaw,
        view.pitch,
        view.yaw,
        weapon.heat.heat(),
        weapon.is_active()
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {}
