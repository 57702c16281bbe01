use thiserror::Error;

use super::DrawRecord;

pub const DEFAULT_MAX_DRAWS: u32 = 25;
// Cooldown is currently disabled, but the mechanism stays live so it can be
// re-enabled by configuration alone.
pub const DEFAULT_COOLDOWN_MS: i64 = 0;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DrawDenied {
    #[error("max draws reached ({max})")]
    MaxDrawsReached { max: u32 },
    #[error("cooldown active, {remaining_ms} ms remaining")]
    CooldownActive { remaining_ms: i64 },
}

#[derive(Debug, Clone, Copy)]
pub struct DrawLimits {
    pub max_draws: u32,
    pub cooldown_ms: i64,
}

impl Default for DrawLimits {
    fn default() -> Self {
        Self {
            max_draws: DEFAULT_MAX_DRAWS,
            cooldown_ms: DEFAULT_COOLDOWN_MS,
        }
    }
}

impl DrawLimits {
    /// The max-draws cap is checked before the cooldown, so an exhausted
    /// record is reported as exhausted regardless of cooldown state.
    pub fn can_draw(&self, record: &DrawRecord, now_ms: i64) -> Result<(), DrawDenied> {
        if record.draw_count >= self.max_draws {
            return Err(DrawDenied::MaxDrawsReached {
                max: self.max_draws,
            });
        }

        if record.last_draw_time > 0 {
            let elapsed = now_ms - record.last_draw_time;
            if elapsed < self.cooldown_ms {
                return Err(DrawDenied::CooldownActive {
                    remaining_ms: self.cooldown_ms - elapsed,
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::UserId;

    fn record(draw_count: u32, last_draw_time: i64) -> DrawRecord {
        let mut record = DrawRecord::empty(UserId::from("user-1".to_string()), 0);
        record.draw_count = draw_count;
        record.last_draw_time = last_draw_time;
        record
    }

    #[test]
    fn fresh_record_is_allowed() {
        let limits = DrawLimits::default();
        assert_eq!(limits.can_draw(&record(0, 0), 1000), Ok(()));
    }

    #[test]
    fn max_draws_denied_regardless_of_cooldown() {
        let limits = DrawLimits {
            max_draws: 25,
            cooldown_ms: 60_000,
        };
        // Way past any cooldown, still denied on the counter.
        assert_eq!(
            limits.can_draw(&record(25, 0), i64::MAX),
            Err(DrawDenied::MaxDrawsReached { max: 25 })
        );
    }

    #[test]
    fn cooldown_reports_remaining_time() {
        let limits = DrawLimits {
            max_draws: 25,
            cooldown_ms: 60_000,
        };
        let r = record(1, 1);
        // Draw at t=1ms, attempt at t=30001ms: 30s remaining.
        assert_eq!(
            limits.can_draw(&r, 30_001),
            Err(DrawDenied::CooldownActive {
                remaining_ms: 30_000
            })
        );
        // One millisecond past the window succeeds.
        assert_eq!(limits.can_draw(&r, 60_002), Ok(()));
    }

    #[test]
    fn zero_cooldown_never_blocks() {
        let limits = DrawLimits {
            max_draws: 25,
            cooldown_ms: 0,
        };
        assert_eq!(limits.can_draw(&record(3, 999), 999), Ok(()));
    }
}
