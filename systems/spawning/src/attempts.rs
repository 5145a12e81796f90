use station_events_core::ScalingConfig;

/// Derives how many spawn attempts a run performs for the given population.
///
/// With `players_per_spawn == 0` scaling is disabled and the lower clamp is
/// used directly. Otherwise every full `players_per_spawn` players above
/// `baseline_players` adds one attempt on top of `base_spawns`. The result is
/// always clamped into `[min_spawns, max_spawns]`, whatever the player count.
#[must_use]
pub fn compute_attempts(player_count: i64, config: &ScalingConfig) -> u32 {
    debug_assert!(
        config.min_spawns <= config.max_spawns,
        "scaling config must be validated before use"
    );

    let attempts = if config.players_per_spawn == 0 {
        config.min_spawns
    } else {
        let effective = player_count
            .saturating_sub(i64::from(config.baseline_players))
            .max(0);
        let from_players = effective / i64::from(config.players_per_spawn);
        let from_players = u32::try_from(from_players).unwrap_or(u32::MAX);
        config.base_spawns.saturating_add(from_players)
    };

    attempts.max(config.min_spawns).min(config.max_spawns)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn documented_config() -> ScalingConfig {
        ScalingConfig {
            players_per_spawn: 3,
            min_spawns: 1,
            max_spawns: 5,
            baseline_players: 6,
            base_spawns: 0,
        }
    }

    #[test]
    fn players_above_baseline_add_attempts() {
        assert_eq!(compute_attempts(15, &documented_config()), 3);
    }

    #[test]
    fn empty_server_uses_lower_clamp() {
        assert_eq!(compute_attempts(0, &documented_config()), 1);
    }

    #[test]
    fn negative_population_uses_lower_clamp() {
        assert_eq!(compute_attempts(-40, &documented_config()), 1);
        assert_eq!(compute_attempts(i64::MIN, &documented_config()), 1);
    }

    #[test]
    fn huge_population_hits_upper_clamp() {
        assert_eq!(compute_attempts(i64::MAX, &documented_config()), 5);
    }

    #[test]
    fn zero_players_per_spawn_disables_scaling() {
        let config = ScalingConfig {
            players_per_spawn: 0,
            min_spawns: 2,
            max_spawns: 6,
            baseline_players: 0,
            base_spawns: 4,
        };
        for players in [-5, 0, 1, 12, 100, 10_000] {
            assert_eq!(compute_attempts(players, &config), 2);
        }
    }

    #[test]
    fn base_spawns_apply_below_baseline() {
        let config = ScalingConfig {
            base_spawns: 2,
            ..documented_config()
        };
        assert_eq!(compute_attempts(3, &config), 2);
        assert_eq!(compute_attempts(9, &config), 3);
    }

    #[test]
    fn defaults_scale_one_attempt_per_twelve_players() {
        let config = ScalingConfig::default();
        assert_eq!(compute_attempts(0, &config), 1);
        assert_eq!(compute_attempts(23, &config), 1);
        assert_eq!(compute_attempts(24, &config), 2);
        assert_eq!(compute_attempts(80, &config), 3);
    }

    #[test]
    fn result_stays_within_clamp_and_is_monotonic() {
        for players_per_spawn in 1..=5 {
            for min_spawns in 0..=3 {
                for extra in 0..=3 {
                    for baseline_players in [0, 4, 10] {
                        for base_spawns in [0, 1, 7] {
                            let config = ScalingConfig {
                                players_per_spawn,
                                min_spawns,
                                max_spawns: min_spawns + extra,
                                baseline_players,
                                base_spawns,
                            };
                            let mut previous = 0;
                            for players in -20..=60 {
                                let attempts = compute_attempts(players, &config);
                                assert!(attempts >= config.min_spawns, "{config:?} @ {players}");
                                assert!(attempts <= config.max_spawns, "{config:?} @ {players}");
                                assert!(attempts >= previous, "{config:?} @ {players}");
                                previous = attempts;
                            }
                        }
                    }
                }
            }
        }
    }
}
