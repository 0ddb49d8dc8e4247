//! Visualization plugin - Self-contained plugin pattern
//!
//! Mirrors the active scene's render elements into Bevy entities. One entity
//! is spawned per element when a scene becomes ready; afterwards only
//! transforms, visibility and material colours are synchronised each frame.
//! Also runs the level-of-detail policy against the camera position.

use crate::plugins::simulation::SimulationSet;
use crate::prelude::*;

/// Plugin that draws the scene
pub struct VisualizationPlugin;

impl Plugin for VisualizationPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ElementBuffer>();
        app.insert_resource(AmbientLight {
            color: Color::WHITE,
            brightness: 40.0,
            ..default()
        });

        app.add_systems(Startup, create_element_meshes);
        app.add_systems(
            Update,
            (spawn_scene_elements, apply_level_of_detail, sync_scene_elements)
                .chain()
                .after(SimulationSet::Commands),
        );
    }
}

/// Links an entity to one element of the active scene's element list.
#[derive(Component, Debug, Clone, Copy, PartialEq)]
pub struct SceneElement {
    pub index: usize,
    /// Colour last written to the entity's material
    pub color: Srgba,
}

/// Light emitted by a star of the active scene.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneLight;

/// Scratch space reused for collecting elements every frame.
#[derive(Resource, Default, Deref, DerefMut)]
pub struct ElementBuffer(pub Vec<RenderElement>);

/// Unit meshes shared by every sphere and cone element. Rings get their own
/// mesh since their proportions differ.
#[derive(Resource)]
pub struct ElementMeshes {
    pub sphere: Handle<Mesh>,
    pub cone: Handle<Mesh>,
}

fn create_element_meshes(mut commands: Commands, mut meshes: ResMut<Assets<Mesh>>) {
    commands.insert_resource(ElementMeshes {
        sphere: meshes.add(Sphere::new(1.0).mesh().uv(24, 16)),
        cone: meshes.add(Cone::new(1.0, 1.0)),
    });
}

/// Transform placing a unit primitive so it matches `element`.
pub fn element_transform(element: &RenderElement) -> Transform {
    let position = element.position.as_vec3();
    let axis = element.axis.as_vec3();
    let direction = axis.try_normalize().unwrap_or(Vec3::Y);
    let orientation = Quat::from_rotation_arc(Vec3::Y, direction);

    match element.shape {
        Shape::Sphere => Transform::from_translation(position)
            .with_scale(Vec3::splat(element.radius as f32)),
        Shape::Ring => Transform::from_translation(position)
            .with_rotation(orientation * Quat::from_rotation_y(element.spin as f32)),
        // Unit cone is centred on its midpoint with the tip at +Y
        Shape::Cone => Transform::from_translation(position + axis / 2.0)
            .with_rotation(orientation)
            .with_scale(Vec3::new(
                element.radius as f32,
                axis.length(),
                element.radius as f32,
            )),
    }
}

fn element_material(element: &RenderElement, bloom_intensity: f32) -> StandardMaterial {
    let mut material = StandardMaterial {
        base_color: element.color.into(),
        alpha_mode: alpha_mode(element.color),
        ..default()
    };
    apply_emission(&mut material, element, bloom_intensity);
    material
}

fn alpha_mode(color: Srgba) -> AlphaMode {
    if color.alpha < 1.0 {
        AlphaMode::Blend
    } else {
        AlphaMode::Opaque
    }
}

fn apply_emission(material: &mut StandardMaterial, element: &RenderElement, bloom_intensity: f32) {
    material.emissive = if element.emissive {
        LinearRgba::from(element.color) * (1.0 + bloom_intensity) * element.color.alpha
    } else {
        LinearRgba::BLACK
    };
}

fn visibility(element: &RenderElement) -> Visibility {
    if element.visible {
        Visibility::Visible
    } else {
        Visibility::Hidden
    }
}

/// Recreates every element entity whenever a scene becomes ready.
#[allow(clippy::too_many_arguments)]
fn spawn_scene_elements(
    mut ready: EventReader<SceneReady>,
    mut commands: Commands,
    existing: Query<Entity, Or<(With<SceneElement>, With<SceneLight>)>>,
    scene: Option<Res<ActiveScene>>,
    element_meshes: Option<Res<ElementMeshes>>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    mut buffer: ResMut<ElementBuffer>,
    config: Res<SimulationConfig>,
) {
    if ready.read().count() == 0 {
        return;
    }
    let (Some(scene), Some(element_meshes)) = (scene, element_meshes) else {
        return;
    };

    for entity in &existing {
        commands.entity(entity).despawn();
    }

    buffer.clear();
    scene.collect_elements(&mut buffer);
    let bloom_intensity = config.rendering.bloom_intensity;

    for (index, element) in buffer.iter().enumerate() {
        let mesh = match element.shape {
            Shape::Sphere => element_meshes.sphere.clone(),
            Shape::Cone => element_meshes.cone.clone(),
            Shape::Ring => {
                let half = (element.thickness / 2.0) as f32;
                let radius = element.radius as f32;
                meshes.add(Torus::new((radius - half).max(0.0), radius + half))
            }
        };

        commands.spawn((
            SceneElement {
                index,
                color: element.color,
            },
            Mesh3d(mesh),
            MeshMaterial3d(materials.add(element_material(element, bloom_intensity))),
            element_transform(element),
            visibility(element),
        ));
    }

    for body in scene.bodies() {
        if let CelestialBody::Star(star) = body {
            commands.spawn((
                Name::new(format!("{} light", star.name())),
                SceneLight,
                PointLight {
                    color: Color::from(star.color()),
                    intensity: config.rendering.star_light_intensity,
                    range: (star.radius() * 1_000.0) as f32,
                    shadows_enabled: false,
                    ..default()
                },
                Transform::from_translation(star.position().as_vec3()),
            ));
        }
    }

    debug!("Spawned {} scene element entities", buffer.len());
}

fn apply_level_of_detail(
    scene: Option<ResMut<ActiveScene>>,
    cameras: Query<&GlobalTransform, With<Camera3d>>,
) {
    let (Some(mut scene), Ok(camera)) = (scene, cameras.single()) else {
        return;
    };

    let flips = scene.apply_lod(camera.translation().as_dvec3());
    if flips > 0 {
        debug!("Level of detail changed for {flips} planet(s)");
    }
}

fn sync_scene_elements(
    scene: Option<Res<ActiveScene>>,
    mut buffer: ResMut<ElementBuffer>,
    mut elements: Query<(
        &mut SceneElement,
        &mut Transform,
        &mut Visibility,
        &MeshMaterial3d<StandardMaterial>,
    )>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<SimulationConfig>,
) {
    let Some(scene) = scene else {
        return;
    };

    buffer.clear();
    scene.collect_elements(&mut buffer);

    for (mut link, mut transform, mut shown, material) in &mut elements {
        let Some(element) = buffer.get(link.index) else {
            continue;
        };

        *transform = element_transform(element);
        shown.set_if_neq(visibility(element));

        if link.color != element.color {
            link.color = element.color;
            if let Some(material) = materials.get_mut(&material.0) {
                material.base_color = element.color.into();
                material.alpha_mode = alpha_mode(element.color);
                apply_emission(material, element, config.rendering.bloom_intensity);
            }
        }
    }
}
