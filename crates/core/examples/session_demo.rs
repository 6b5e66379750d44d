//! Example demonstrating a binding session from first run to reload
//!
//! Run with: cargo run --package volmix-core --example session_demo

use volmix_core::domain::{Category, Fader, Session, Target, TargetDirectory, TargetId};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("volmix_core=debug,info")
        .init();

    println!("=== Volmix Session Demo ===\n");

    let config_path = std::env::temp_dir().join("volmix_demo.conf");
    let _ = std::fs::remove_file(&config_path);

    // 1. First run: no binding file yet
    println!("1. Opening {}...", config_path.display());
    let mut session = Session::load_default(&config_path)?;
    println!("   ✓ Empty session ({} bindings)", session.store().len());

    // 2. Pretend discovery found a few targets
    println!("\n2. Registering targets...");
    let directory: TargetDirectory = vec![
        Target::new(TargetId::from("51"), Category::Output, "Built-in Audio Analog Stereo"),
        Target::new(TargetId::from("60"), Category::Input, "USB Microphone"),
        Target::new(TargetId::from("77"), Category::Application, "Firefox"),
    ]
    .into_iter()
    .collect();
    for target in directory.iter() {
        println!("   - {} {}", target.id, target.display_name());
        session.add_column(target.id.clone())?;
    }
    session.set_directory(directory);

    // 3. Bind, then move a target to another fader of the same layer
    println!("\n3. Binding targets on layer 0...");
    session.toggle_binding(0, 1, &TargetId::from("51"))?;
    session.toggle_binding(0, 3, &TargetId::from("77"))?;
    session.toggle_binding(0, 2, &TargetId::from("51"))?;
    println!("   ✓ Fader 1: {:?}", session.query(0, 1));
    println!("   ✓ Fader 2: {:?}", session.query(0, 2));

    // 4. Render the grid
    println!("\n4. Layer 0 grid:");
    let grid = session.grid(0);
    for fader in Fader::all() {
        let row: Vec<&str> = (0..grid.columns.len())
            .map(|col| if grid.is_bound(fader, col) { "BOUND" } else { "-" })
            .collect();
        println!("   FADER {} {}", fader, row.join(" "));
    }

    // 5. Reload from disk
    println!("\n5. Reloading...");
    print!("{}", std::fs::read_to_string(&config_path)?);
    let reloaded = Session::load_default(&config_path)?;
    println!(
        "   ✓ Reloaded {} bindings, {} columns",
        reloaded.store().len(),
        reloaded.columns().len()
    );

    std::fs::remove_file(&config_path)?;
    println!("\n=== Demo complete ===");
    Ok(())
}
