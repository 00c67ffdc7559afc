use std::env;
use std::path::PathBuf;

use runtime::{Dashboard, DashboardConfig};
use scene::scenario_for_year;
use tools::{parse_snapshot_args, snapshot_events, usage};

fn main() {
    if let Err(e) = real_main() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn real_main() -> Result<(), String> {
    let mut args: Vec<String> = env::args().collect();
    let exe = args
        .first()
        .cloned()
        .unwrap_or_else(|| "climdash".to_string());
    if args.len() < 2 {
        return Err(usage(&exe));
    }

    let cmd = args[1].clone();
    args.drain(0..2);

    match cmd.as_str() {
        "years" => cmd_years(args),
        "snapshot" => cmd_snapshot(args),
        _ => Err(usage(&exe)),
    }
}

fn cmd_years(args: Vec<String>) -> Result<(), String> {
    // climdash years <grid.csv>
    let [path]: [String; 1] = args
        .try_into()
        .map_err(|_| "years requires <grid.csv>".to_string())?;
    let path = PathBuf::from(path);

    let dataset = formats::load_grid_csv(&path).map_err(|e| e.to_string())?;
    let report = dataset.report();
    for year in dataset.distinct_years_ascending() {
        println!("{year}\t{}", scenario_for_year(*year));
    }
    eprintln!(
        "{}: {} rows, {} cells, {} skipped",
        path.display(),
        report.rows,
        report.cells,
        report.skipped_rows
    );
    Ok(())
}

fn cmd_snapshot(args: Vec<String>) -> Result<(), String> {
    let args = parse_snapshot_args(&args)?;

    let dataset = formats::load_grid_csv(&args.grid).map_err(|e| e.to_string())?;
    let geography =
        formats::load_geography(&args.geography, &args.object).map_err(|e| e.to_string())?;
    let mut dashboard = Dashboard::new(dataset, geography, DashboardConfig::default())
        .map_err(|e| e.to_string())?;

    for event in snapshot_events(&args, &dashboard)? {
        dashboard.dispatch(event);
    }

    let payload =
        serde_json::to_string_pretty(&dashboard.render()).map_err(|e| format!("json: {e}"))?;
    println!("{payload}");
    Ok(())
}
