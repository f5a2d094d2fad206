use glam::DVec2;
use satbonk::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// A spinning crate drifts across a wall panel while the world steps every shape.
fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .without_time()
        .init();

    let mut world = World::default();

    let cfg = ShapeConfig::default().with_speed(0.0, 8.0).with_rotation(0.0, 15.0);
    let mut crate_box = Shape::rectangle(10.0, 10.0, cfg)?;
    crate_box
        .set_position(Point::new(0.0, 100.0))
        .set_velocity(DVec2::new(5.0, 0.0))
        .set_rotation(9.0);
    let crate_box = world.insert_into(crate_box, "crates");

    let mut panel = Shape::rectangle(40.0, 40.0, ShapeConfig::default())?;
    panel.set_position(Point::new(100.0, 100.0));
    let panel = world.insert_into(panel, "walls");

    for kind in EventKind::ALL {
        world.on(crate_box, kind, "walls", |e: &Event| {
            info!(actor = %e.actor, interactor = %e.interactor, "{}", e.kind);
        });
    }

    for tick in 0..45 {
        world.step(1.0);
        if let Some(shape) = world.shape(crate_box) {
            info!(
                tick,
                x = shape.x(),
                angle = shape.angle(),
                inside = world.contains(panel, shape.position()),
                "crate"
            );
        }
    }

    info!(stats = ?world.debug_stats(), "done");
    Ok(())
}
