use bevy::prelude::*;

use crate::{
    components::Ball,
    grabber::Grabbed,
    resources::{Config, Cradle},
};

/// Contact is declared slightly inside the touching distance to prevent
/// neighbours from sticking.
const CONTACT_SLACK: f32 = 0.1;
/// Extra separation added by the positional correction so the same pair
/// does not re-trigger on the next step.
const SEPARATION_PAD: f32 = 0.01;

/// Fixed-timestep stepper: integrate every free ball, then resolve
/// contacts between neighbours in cradle order.
pub fn simulate(
    mut query: Query<(Entity, &mut Ball, &mut Transform)>,
    cradle: Res<Cradle>,
    grabbed: Res<Grabbed>,
    config: Res<Config>,
    fixed_time: Res<FixedTime>,
) {
    let dt = fixed_time.period.as_secs_f32() * config.time_scale;

    for (entity, mut ball, mut transform) in query.iter_mut() {
        if grabbed.entity == Some(entity) {
            continue;
        }
        ball.integrate(dt, &config);
        let z = transform.translation.z;
        transform.translation = ball.position().extend(z);
    }

    // A grabbed ball still takes part in contacts; only integration skips it.
    for pair in cradle.balls.windows(2) {
        if let Ok([(_, mut ball_a, mut trans_a), (_, mut ball_b, mut trans_b)]) =
            query.get_many_mut([pair[0], pair[1]])
        {
            handle_ball_collision(&mut ball_a, &mut trans_a, &mut ball_b, &mut trans_b, &config);
        }
    }

    // Contacts move balls off the string arc; snap free balls back onto it.
    for (entity, ball, mut transform) in query.iter_mut() {
        if grabbed.entity == Some(entity) {
            continue;
        }
        let z = transform.translation.z;
        transform.translation = ball.position().extend(z);
    }
}

pub fn handle_ball_collision(
    ball_a: &mut Ball,
    trans_a: &mut Transform,
    ball_b: &mut Ball,
    trans_b: &mut Transform,
    config: &Config,
) {
    let dir = (trans_b.translation - trans_a.translation).truncate();
    let d = dir.length();
    let min_distance = ball_a.radius + ball_b.radius - CONTACT_SLACK;
    // Coincident centers have no usable normal; skip the pair this step.
    if d == 0.0 || d >= min_distance {
        return;
    }

    let normal = dir / d;
    let corr = (min_distance - d + SEPARATION_PAD) * 0.5;
    trans_a.translation -= (normal * corr).extend(0.0);
    trans_b.translation += (normal * corr).extend(0.0);

    ball_a.set_angle_from(trans_a.translation.truncate());
    ball_b.set_angle_from(trans_b.translation.truncate());

    let v1 = ball_a.angular_velocity;
    let v2 = ball_b.angular_velocity;

    let m1 = ball_a.mass;
    let m2 = ball_b.mass;

    let new_v1 = (m1 * v1 + m2 * v2 - m2 * (v1 - v2) * config.restitution) / (m1 + m2);
    let new_v2 = (m1 * v1 + m2 * v2 - m1 * (v2 - v1) * config.restitution) / (m1 + m2);

    ball_a.angular_velocity = new_v1;
    ball_b.angular_velocity = new_v2;
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn test_ball(angle: f32) -> Ball {
        Ball {
            mass: 2.0,
            length: 200.0,
            radius: 20.0,
            angle,
            anchor: Vec2::new(0.0, 200.0),
            ..default()
        }
    }

    #[test]
    fn ball_at_rest_stays_at_rest() {
        let config = Config::default();
        let mut ball = test_ball(0.0);
        for _ in 0..10_000 {
            ball.integrate(1.0 / 120.0, &config);
        }
        assert_eq!(ball.angle, 0.0);
        assert_eq!(ball.angular_velocity, 0.0);
    }

    #[test]
    fn damping_bleeds_amplitude() {
        let config = Config::default();
        let mut ball = test_ball(0.5);
        let dt = 1.0 / 120.0;

        // Peak |angle| at every turning point (velocity sign change).
        let mut peaks = Vec::new();
        let mut prev_velocity = 0.0_f32;
        for _ in 0..50_000 {
            ball.integrate(dt, &config);
            if (prev_velocity < 0.0 && ball.angular_velocity >= 0.0)
                || (prev_velocity > 0.0 && ball.angular_velocity <= 0.0)
            {
                peaks.push(ball.angle.abs());
            }
            prev_velocity = ball.angular_velocity;
        }

        assert!(peaks.len() > 10);
        for pair in peaks.windows(2) {
            assert!(pair[1] <= pair[0] + 1e-4, "amplitude grew: {:?}", pair);
        }
    }

    #[test]
    fn equal_mass_contact_swaps_velocities() {
        let config = Config::default();
        let mut a = test_ball(0.0);
        let mut b = test_ball(0.0);
        b.anchor.x = 30.0;
        a.angular_velocity = 1.5;
        b.angular_velocity = -0.25;

        let mut ta = Transform::from_translation(a.position().extend(0.0));
        let mut tb = Transform::from_translation(b.position().extend(0.0));
        handle_ball_collision(&mut a, &mut ta, &mut b, &mut tb, &config);

        assert_relative_eq!(a.angular_velocity, -0.25, epsilon = 1e-5);
        assert_relative_eq!(b.angular_velocity, 1.5, epsilon = 1e-5);
    }

    #[test]
    fn contact_conserves_momentum() {
        let config = Config::default();
        let mut a = test_ball(0.0);
        a.mass = 2.0;
        let mut b = test_ball(0.0);
        b.mass = 5.0;
        b.anchor.x = 25.0;
        a.angular_velocity = 2.0;
        b.angular_velocity = -1.0;

        let before = a.mass * a.angular_velocity + b.mass * b.angular_velocity;

        let mut ta = Transform::from_translation(a.position().extend(0.0));
        let mut tb = Transform::from_translation(b.position().extend(0.0));
        handle_ball_collision(&mut a, &mut ta, &mut b, &mut tb, &config);

        let after = a.mass * a.angular_velocity + b.mass * b.angular_velocity;
        assert_relative_eq!(before, after, epsilon = 1e-4);
    }

    #[test]
    fn contact_restores_separation() {
        let config = Config::default();
        let mut a = test_ball(0.0);
        let mut b = test_ball(0.0);
        b.anchor.x = 12.0;

        let mut ta = Transform::from_translation(a.position().extend(0.0));
        let mut tb = Transform::from_translation(b.position().extend(0.0));
        handle_ball_collision(&mut a, &mut ta, &mut b, &mut tb, &config);

        let separation = (tb.translation - ta.translation).truncate().length();
        let min_distance = a.radius + b.radius - CONTACT_SLACK;
        assert!(
            separation >= min_distance - 1e-4,
            "still overlapping: {} < {}",
            separation,
            min_distance
        );
    }

    #[test]
    fn coincident_balls_are_skipped() {
        let config = Config::default();
        let mut a = test_ball(0.2);
        let mut b = test_ball(0.2);
        a.angular_velocity = 1.0;
        b.angular_velocity = -1.0;

        let mut ta = Transform::from_translation(a.position().extend(0.0));
        let mut tb = Transform::from_translation(b.position().extend(0.0));
        handle_ball_collision(&mut a, &mut ta, &mut b, &mut tb, &config);

        assert!(ta.translation.is_finite() && tb.translation.is_finite());
        assert_eq!(a.angular_velocity, 1.0);
        assert_eq!(b.angular_velocity, -1.0);
        assert_eq!(ta.translation, tb.translation);
    }

    #[test]
    fn fixed_step_app_advances_cradle() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins)
            .init_resource::<Config>()
            .init_resource::<Cradle>()
            .init_resource::<Grabbed>()
            .insert_resource(FixedTime::new_from_secs(1.0 / 120.0))
            .add_system(simulate.in_schedule(CoreSchedule::FixedUpdate));

        let start_angle = -0.5;
        let mut ids = Vec::new();
        for i in 0..2 {
            let mut ball = test_ball(if i == 0 { start_angle } else { 0.0 });
            ball.anchor.x = i as f32 * 40.5;
            let pos = ball.position();
            let id = app
                .world
                .spawn((
                    ball,
                    TransformBundle::from_transform(Transform::from_translation(pos.extend(0.0))),
                ))
                .id();
            ids.push(id);
        }
        app.world.resource_mut::<Cradle>().balls = ids.clone();

        for _ in 0..5 {
            std::thread::sleep(std::time::Duration::from_millis(20));
            app.update();
        }

        let ball = app.world.get::<Ball>(ids[0]).unwrap();
        assert!(
            ball.angle > start_angle,
            "displaced ball never moved: {}",
            ball.angle
        );
    }
}
