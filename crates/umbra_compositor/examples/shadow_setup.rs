//! Shadow Node Setup Demo
//!
//! This example authors a shadow node with three PSSM sun cascades and one
//! focused spot map packed into a single depth atlas, finalizes it, and
//! prints the derived state.
//!
//! Run with:
//! ```
//! cargo run --example shadow_setup
//! ```

use glam::Vec2;
use umbra_compositor::prelude::*;

fn main() {
    env_logger::init();

    println!("Shadow Node Setup Demo");
    println!("======================\n");

    match build_and_finalize() {
        Ok(node) => report(&node),
        Err(e) => {
            eprintln!("Failed to build shadow node: {e}");
            std::process::exit(1);
        }
    }

    println!();
    demo_warning_capture();
}

fn build_and_finalize() -> CompositorResult<ShadowNodeDef> {
    let mut node = ShadowNodeDef::new("main_shadows");
    node.add_texture_definition(TextureDef::depth("atlas", 4096, 4096))?;

    // Sun cascades in the top half, spot map in the bottom left quarter.
    node.reserve_definitions(4);
    node.set_default_technique(ShadowMapTechnique::Pssm);
    let cascades = [
        node.add_definition(0, 0, "atlas", 0, Vec2::new(0.0, 0.0), Vec2::new(0.5, 0.5), 0)?,
        node.add_definition(0, 1, "atlas", 0, Vec2::new(0.5, 0.0), Vec2::new(0.25, 0.25), 0)?,
        node.add_definition(0, 2, "atlas", 0, Vec2::new(0.75, 0.0), Vec2::new(0.25, 0.25), 0)?,
    ];

    node.set_default_technique(ShadowMapTechnique::Focused);
    let spot = node.add_definition(1, 0, "atlas", 0, Vec2::new(0.0, 0.5), Vec2::new(0.5, 0.5), 0)?;

    for (index, map) in cascades.into_iter().enumerate() {
        let target = node.add_target_pass("atlas")?;
        let camera = format!("sun_cam_{index}");
        add_caster_passes(&mut node, target, map, &camera)?;
    }

    let spot_target = node.add_target_pass("atlas")?;
    node.set_shadow_map_supported_light_types(
        spot_target,
        LightTypeMask::SPOT | LightTypeMask::POINT,
    )?;
    add_caster_passes(&mut node, spot_target, spot, "spot_cam")?;

    node.finalize()?;
    Ok(node)
}

fn add_caster_passes(
    node: &mut ShadowNodeDef,
    target: usize,
    map: ShadowMapHandle,
    camera: &str,
) -> CompositorResult<()> {
    let clear = node.add_pass(target, PassKind::Clear)?;
    clear.shadow_map = Some(map);

    let scene = node.add_pass(target, PassKind::Scene(ScenePassDef::new(camera)))?;
    scene.shadow_map = Some(map);
    scene.include_overlays = false;
    Ok(())
}

fn report(node: &ShadowNodeDef) {
    println!("Node '{}' finalized", node.name());
    println!("  Shadow maps: {}", node.definitions().len());
    println!("  Distinct lights: {}", node.num_lights());
    println!("  Render queues: {}..={}", node.min_rq(), node.max_rq());

    println!("\nPer-light coverage:");
    for (light, mask) in node.light_types_mask().iter().enumerate() {
        println!("  light {light}: {mask:?}");
    }

    println!("\nSetup sharing:");
    for (index, def) in node.definitions().iter().enumerate() {
        match def.shares_setup_with() {
            Some(source) => println!("  map {index} reuses the frustum setup of map {source}"),
            None => println!("  map {index} computes its own frustum setup"),
        }
    }

    println!("\nAtlas viewports:");
    for target in node.targets() {
        for pass in target.passes() {
            let vp = pass.viewport;
            println!(
                "  '{}' pass renders to ({}, {}) {}x{}",
                target.render_target_name(),
                vp.left,
                vp.top,
                vp.width,
                vp.height
            );
        }
    }
}

/// Finalize a deliberately misconfigured node and print what got corrected
fn demo_warning_capture() {
    println!("Warning capture");
    println!("===============\n");

    let mut node = match author_noisy_node() {
        Ok(node) => node,
        Err(e) => {
            eprintln!("Failed to author the noisy node: {e}");
            return;
        }
    };

    let mut sink = CaptureSink::new();
    match node.finalize_with(&mut sink) {
        Ok(_) => {
            println!("Finalized with {} corrections:", sink.len());
            for message in sink.messages() {
                println!("  - {message}");
            }
        }
        Err(e) => eprintln!("Finalization failed: {e}"),
    }
}

/// Two cascade sets for the same light with clashing split counts
fn author_noisy_node() -> CompositorResult<ShadowNodeDef> {
    let mut node = ShadowNodeDef::new("noisy");
    node.reserve_definitions(2);
    node.set_default_technique(ShadowMapTechnique::Pssm);

    let first =
        node.add_definition(0, 0, "maps", 0, Vec2::new(0.0, 0.0), Vec2::new(0.5, 1.0), 0)?;
    node.add_definition(0, 1, "maps", 0, Vec2::new(0.5, 0.0), Vec2::new(0.5, 1.0), 0)?;

    if let Some(def) = node.definition_mut(first) {
        def.num_splits = 9;
    }

    Ok(node)
}
