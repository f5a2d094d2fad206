use satbonk::*;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .without_time()
        .init();

    let mut world = World::default();
    let ball = world.insert_into(Shape::circle(10.0, ShapeConfig::default())?, "balls");
    let mut pond = Shape::circle(20.0, ShapeConfig::default())?;
    pond.set_position(Point::new(100.0, 100.0));
    let pond = world.insert(pond);

    for kind in EventKind::ALL {
        world.on(ball, kind, DEFAULT_LAYER, |e: &Event| {
            info!(actor = %e.actor, interactor = %e.interactor, "{}", e.kind);
        });
    }

    for (x, y) in [(0.0, 0.0), (85.0, 85.0), (100.0, 100.0), (115.0, 115.0), (200.0, 200.0)] {
        if let Some(shape) = world.shape_mut(ball) {
            shape.set_position(Point::new(x, y));
        }
        world.run(ball, 1.0);
        info!(x, y, state = ?world.check(ball, pond), "moved ball");
    }

    let seen: Vec<String> = world.drain_events().iter().map(|e| e.kind.to_string()).collect();
    println!("events: [{}]", seen.join(", "));
    Ok(())
}
