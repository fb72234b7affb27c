use core::time::Duration;

use bevy::prelude::*;

/// Easing applied to the normalized progress of a tween.
#[derive(Clone, Copy, Default)]
pub enum Ease {
    #[default]
    Linear,
    BounceOut,
}

impl Ease {
    fn apply(self, t: f32) -> f32 {
        match self {
            Self::Linear => t,
            Self::BounceOut => ease_out_bounce(t),
        }
    }
}

/// Timed translation tween. The component removes itself once the duration has
/// elapsed, so `Query<(), With<MoveTo>>` doubles as an "animations still
/// running" probe.
#[derive(Component)]
pub struct MoveTo {
    from: Vec2,
    to: Vec2,
    timer: Timer,
    ease: Ease,
}

impl MoveTo {
    pub fn new(from: Vec2, to: Vec2, duration: Duration) -> Self {
        Self {
            from,
            to,
            timer: Timer::new(duration, TimerMode::Once),
            ease: Ease::Linear,
        }
    }

    pub const fn with_ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }
}

/// Timed uniform-scale tween, removed on completion like [`MoveTo`].
#[derive(Component)]
pub struct ScaleTo {
    from: f32,
    to: f32,
    timer: Timer,
}

impl ScaleTo {
    pub fn new(from: f32, to: f32, duration: Duration) -> Self {
        Self {
            from,
            to,
            timer: Timer::new(duration, TimerMode::Once),
        }
    }
}

pub struct TweenPlugin;

impl Plugin for TweenPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Update, (animate_moves, animate_scales));
    }
}

fn animate_moves(
    mut commands: Commands,
    time: Res<Time>,
    mut moves: Query<(Entity, &mut Transform, &mut MoveTo)>,
) {
    for (entity, mut transform, mut tween) in &mut moves {
        tween.timer.tick(time.delta());

        let progress = tween.ease.apply(tween.timer.fraction());
        let position = tween.from.lerp(tween.to, progress);
        transform.translation = position.extend(transform.translation.z);

        if tween.timer.finished() {
            transform.translation = tween.to.extend(transform.translation.z);
            commands.entity(entity).remove::<MoveTo>();
        }
    }
}

fn animate_scales(
    mut commands: Commands,
    time: Res<Time>,
    mut scales: Query<(Entity, &mut Transform, &mut ScaleTo)>,
) {
    for (entity, mut transform, mut tween) in &mut scales {
        tween.timer.tick(time.delta());

        let scale = tween.from + (tween.to - tween.from) * tween.timer.fraction();
        transform.scale = Vec3::new(scale, scale, 1.0);

        if tween.timer.finished() {
            transform.scale = Vec3::new(tween.to, tween.to, 1.0);
            commands.entity(entity).remove::<ScaleTo>();
        }
    }
}

fn ease_out_bounce(t: f32) -> f32 {
    const N1: f32 = 7.5625;
    const D1: f32 = 2.75;

    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounce_ends_at_rest() {
        assert!(ease_out_bounce(0.0).abs() < 1e-6, "starts at 0");
        assert!((ease_out_bounce(1.0) - 1.0).abs() < 1e-3, "ends at 1");
    }

    #[test]
    fn bounce_overshoots_then_settles() {
        // The first bounce peak sits above the midpoint well before t = 1.
        let peak = ease_out_bounce(1.0 / 2.75);
        assert!(peak > 0.99, "first bounce reaches the target, got {peak}");
    }

    #[test]
    fn linear_ease_is_identity() {
        for t in [0.0, 0.25, 0.5, 1.0] {
            assert!(
                (Ease::Linear.apply(t) - t).abs() < f32::EPSILON,
                "linear must not distort progress"
            );
        }
    }
}
