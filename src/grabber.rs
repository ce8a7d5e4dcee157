use bevy::prelude::*;

use crate::{components::Ball, resources::Cradle};

pub struct GrabberPlugin;

impl Plugin for GrabberPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Grabbed>()
            .add_state::<GrabState>()
            .add_system(grab_listen.in_set(OnUpdate(GrabState::None)))
            .add_system(grab_start.in_schedule(OnEnter(GrabState::Moving)))
            .add_system(grab_move.in_set(OnUpdate(GrabState::Moving)))
            .add_system(grab_end.in_schedule(OnExit(GrabState::Moving)))
            .register_type::<Grabbed>();
    }
}

/// The ball currently pinned to the cursor, if any.
#[derive(Reflect, Resource)]
#[reflect(Resource)]
pub struct Grabbed {
    pub entity: Option<Entity>,
    pub mouse_grab: MouseButton,
}

impl Default for Grabbed {
    fn default() -> Self {
        Self {
            entity: None,
            mouse_grab: MouseButton::Left,
        }
    }
}

#[derive(States, PartialEq, Eq, Debug, Clone, Hash, Default)]
pub enum GrabState {
    #[default]
    None,
    Moving,
}

fn grab_listen(
    grabbed: Res<Grabbed>,
    mouse_input: Res<Input<MouseButton>>,
    mut grab_next_state: ResMut<NextState<GrabState>>,
) {
    if mouse_input.just_pressed(grabbed.mouse_grab) {
        grab_next_state.set(GrabState::Moving);
    }
}

fn grab_start(
    mut grabbed: ResMut<Grabbed>,
    mut grab_next_state: ResMut<NextState<GrabState>>,
    window_query: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    cradle: Res<Cradle>,
    mut balls: Query<(&mut Ball, &Transform)>,
) {
    let window = window_query.single();
    let (camera, camera_trans) = camera_query.single();

    let cursor = window
        .cursor_position()
        .and_then(|p| camera.viewport_to_world_2d(camera_trans, p));

    if let Some(cursor) = cursor {
        let hit = first_hit(
            cursor,
            cradle.balls.iter().filter_map(|&e| {
                balls
                    .get(e)
                    .ok()
                    .map(|(ball, trans)| (e, trans.translation.truncate(), ball.radius))
            }),
        );

        if let Some(e) = hit {
            grabbed.entity = Some(e);
            if let Ok((mut ball, _)) = balls.get_mut(e) {
                ball.angular_velocity = 0.0;
            }
            return;
        }
    }

    // Nothing under the cursor, nothing to move.
    grab_next_state.set(GrabState::None);
}

fn grab_move(
    grabbed: Res<Grabbed>,
    mouse_input: Res<Input<MouseButton>>,
    mut grab_next_state: ResMut<NextState<GrabState>>,
    window_query: Query<&Window>,
    camera_query: Query<(&Camera, &GlobalTransform)>,
    mut balls: Query<(&mut Ball, &mut Transform)>,
) {
    if mouse_input.just_released(grabbed.mouse_grab) || grabbed.entity.is_none() {
        grab_next_state.set(GrabState::None);
        return;
    }

    let window = window_query.single();
    let (camera, camera_trans) = camera_query.single();

    if let Some(cursor) = window
        .cursor_position()
        .and_then(|p| camera.viewport_to_world_2d(camera_trans, p))
    {
        if let Ok((mut ball, mut trans)) = balls.get_mut(grabbed.entity.unwrap()) {
            drag_to(&mut ball, &mut trans, cursor);
        }
    }
}

fn grab_end(mut grabbed: ResMut<Grabbed>) {
    grabbed.entity = None;
}

/// First ball in cradle order whose circle contains the cursor.
pub fn first_hit(cursor: Vec2, balls: impl IntoIterator<Item = (Entity, Vec2, f32)>) -> Option<Entity> {
    balls
        .into_iter()
        .find(|(_, center, radius)| center.distance(cursor) <= *radius)
        .map(|(e, _, _)| e)
}

/// Pin a ball to the cursor. The position follows the pointer exactly;
/// the angle is re-derived from it and the ball is brought to rest.
pub fn drag_to(ball: &mut Ball, transform: &mut Transform, target: Vec2) {
    let z = transform.translation.z;
    transform.translation = target.extend(z);
    ball.set_angle_from(target);
    ball.angular_velocity = 0.0;
}
