mod components;
mod grabber;
mod physics;
mod reset;
mod resources;

use components::*;
use grabber::*;
use physics::*;
use reset::*;
use resources::*;

use bevy::{prelude::*, sprite::MaterialMesh2dBundle};
use bevy_inspector_egui::quick::ResourceInspectorPlugin;
use bevy_prototype_debug_lines::{DebugLines, DebugLinesPlugin};

const WINDOW_WIDTH: f32 = 800.0;
const WINDOW_HEIGHT: f32 = 600.0;
const PHYSICS_TIMESTEP: f32 = 1.0 / 120.0;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Newton's Cradle".into(),
                resolution: (WINDOW_WIDTH, WINDOW_HEIGHT).into(),
                resizable: false,
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::WHITE))
        .insert_resource(FixedTime::new_from_secs(PHYSICS_TIMESTEP))
        .init_resource::<Config>()
        .init_resource::<Cradle>()
        .add_plugin(ResourceInspectorPlugin::<Config>::default())
        .add_plugin(DebugLinesPlugin::default())
        .add_plugin(ResetPlugin)
        .add_plugin(GrabberPlugin)
        .add_startup_system(setup)
        .add_system(spawn_cradle.in_schedule(OnEnter(ResetState::Playing)))
        .add_system(
            simulate
                .in_schedule(CoreSchedule::FixedUpdate)
                .run_if(in_state(ResetState::Playing)),
        )
        .add_system(draw_strings)
        .register_type::<Config>()
        .register_type::<Ball>()
        .register_type::<Cradle>()
        .run()
}

fn setup(mut commands: Commands) {
    commands.spawn(Camera2dBundle {
        transform: Transform::from_xyz(0., 0., 100.),
        ..Default::default()
    });

    info!("Drag a ball with the left mouse button");
    info!("Press 'R' to reset, 'Space' to pause");
}

fn spawn_cradle(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<ColorMaterial>>,
    mut cradle: ResMut<Cradle>,
    config: Res<Config>,
) {
    let pitch = config.ball_radius * 2.0 + config.spacing;
    let first_x = -pitch * (config.ball_count - 1) as f32 * 0.5;

    for i in 0..config.ball_count {
        let mut ball = Ball {
            mass: config.ball_mass,
            length: config.string_length,
            radius: config.ball_radius,
            anchor: Vec2::new(first_x + pitch * i as f32, config.anchor_y),
            ..default()
        };
        // Pull the first ball back to set the cradle in motion.
        if i == 0 {
            ball.angle = config.start_angle;
        }
        let pos = ball.position();

        let id = commands
            .spawn((
                MaterialMesh2dBundle {
                    mesh: meshes.add(shape::Circle::new(config.ball_radius).into()).into(),
                    material: materials.add(ColorMaterial::from(Color::BLUE)),
                    transform: Transform::from_translation(pos.extend(0.)),
                    ..default()
                },
                ball,
                Name::new(format!("Ball {}", i)),
            ))
            .id();
        cradle.balls.push(id);
    }
}

fn draw_strings(mut lines: ResMut<DebugLines>, query: Query<(&Ball, &Transform)>) {
    for (ball, trans) in query.iter() {
        lines.line_colored(ball.anchor.extend(0.), trans.translation, 0.0, Color::BLACK);
    }
}
