use bevy::image::{ImageFilterMode, ImageSampler, ImageSamplerDescriptor};
use bevy::prelude::*;
use bevy::render::render_resource::{Extent3d, TextureDimension, TextureFormat};
use ws_preview::PreviewState;
use ws_world::GenerationPreset;

const WINDOW_WIDTH: f32 = 1280.0;
const WINDOW_HEIGHT: f32 = 720.0;

/// On-screen size of the preview, independent of the grid resolution.
const PREVIEW_WIDTH: f32 = 900.0;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Worldsmith - World Generation".into(),
                resolution: (WINDOW_WIDTH, WINDOW_HEIGHT).into(),
                ..default()
            }),
            ..default()
        }))
        .add_plugins((
            ws_core::WsCorePlugin,
            ws_world::WsWorldPlugin,
            ws_preview::WsPreviewPlugin,
            ws_persistence::WsPersistencePlugin,
            ws_editor::WsEditorPlugin,
        ))
        .add_systems(Startup, (setup_camera, prime_preview))
        .add_systems(Update, update_preview_sprite)
        .run();
}

/// Marker for the sprite showing the current preview capture.
#[derive(Component)]
struct PreviewSprite;

fn setup_camera(mut commands: Commands) {
    commands.spawn(Camera2d);
}

/// Kick off the first preview without waiting out the debounce window.
fn prime_preview(preset: Res<GenerationPreset>, mut preview: ResMut<PreviewState>) {
    preview.scheduler.preset_changed(&preset);
    preview.scheduler.request_refresh();
}

/// Swap in a freshly captured preview image when one is ready.
fn update_preview_sprite(
    mut preview: ResMut<PreviewState>,
    mut images: ResMut<Assets<Image>>,
    mut commands: Commands,
    mut query: Query<(&mut Sprite, &mut Visibility), With<PreviewSprite>>,
) {
    if !preview.scheduler.is_enabled() {
        for (_, mut visibility) in query.iter_mut() {
            *visibility = Visibility::Hidden;
        }
        return;
    }
    for (_, mut visibility) in query.iter_mut() {
        *visibility = Visibility::Inherited;
    }

    if !preview.capture_if_ready() {
        return;
    }
    let Some(capture) = &preview.image else {
        return;
    };

    let aspect = capture.height as f32 / capture.width as f32;
    let size = Vec2::new(PREVIEW_WIDTH, PREVIEW_WIDTH * aspect);
    let handle = images.add(create_image(
        capture.width,
        capture.height,
        capture.rgba.clone(),
    ));

    if let Some((mut sprite, _)) = query.iter_mut().next() {
        sprite.image = handle;
        sprite.custom_size = Some(size);
    } else {
        commands.spawn((
            Sprite {
                image: handle,
                custom_size: Some(size),
                ..default()
            },
            PreviewSprite,
        ));
    }
}

fn create_image(width: usize, height: usize, data: Vec<u8>) -> Image {
    let mut image = Image::new(
        Extent3d {
            width: width as u32,
            height: height as u32,
            depth_or_array_layers: 1,
        },
        TextureDimension::D2,
        data,
        TextureFormat::Rgba8UnormSrgb,
        default(),
    );

    // Nearest-neighbor filtering keeps tile edges crisp when scaled up
    image.sampler = ImageSampler::Descriptor(ImageSamplerDescriptor {
        mag_filter: ImageFilterMode::Nearest,
        min_filter: ImageFilterMode::Nearest,
        ..default()
    });

    image
}
