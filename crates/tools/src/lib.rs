//! Argument handling for the `climdash` command line tool.

use std::path::PathBuf;

use foundation::bounds::Aabb2;
use runtime::{Dashboard, Event};
use scene::Variable;

#[derive(Debug, Clone, PartialEq)]
pub struct SnapshotArgs {
    pub grid: PathBuf,
    pub geography: PathBuf,
    pub year: Option<i32>,
    pub variable: Variable,
    pub brush: Option<Aabb2>,
    pub state: Option<String>,
    pub object: String,
}

/// `<grid.csv> <geography.json> [--year Y] [--variable tas|pr]
/// [--brush x0,y0,x1,y1] [--state ID] [--object NAME]`
pub fn parse_snapshot_args(args: &[String]) -> Result<SnapshotArgs, String> {
    let mut positional: Vec<PathBuf> = Vec::new();
    let mut year = None;
    let mut variable = Variable::default();
    let mut brush = None;
    let mut state = None;
    let mut object = formats::DEFAULT_STATES_OBJECT.to_string();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        let mut value = || {
            i += 1;
            args.get(i)
                .cloned()
                .ok_or_else(|| format!("{flag} requires a value"))
        };
        match flag {
            "--year" => {
                let raw = value()?;
                year = Some(raw.parse().map_err(|_| format!("invalid year: {raw}"))?);
            }
            "--variable" => {
                let raw = value()?;
                variable =
                    Variable::parse(&raw).ok_or_else(|| format!("unknown variable: {raw}"))?;
            }
            "--brush" => brush = Some(parse_brush(&value()?)?),
            "--state" => state = Some(value()?),
            "--object" => object = value()?,
            s if s.starts_with('-') => return Err(format!("unknown arg: {s}")),
            _ => positional.push(PathBuf::from(flag)),
        }
        i += 1;
    }

    if brush.is_some() && state.is_some() {
        return Err("--brush and --state are mutually exclusive".to_string());
    }
    let [grid, geography]: [PathBuf; 2] = positional
        .try_into()
        .map_err(|_| "snapshot requires <grid.csv> <geography.json>".to_string())?;

    Ok(SnapshotArgs {
        grid,
        geography,
        year,
        variable,
        brush,
        state,
        object,
    })
}

/// Parses `x0,y0,x1,y1` map pixels; corners may be given in any order.
pub fn parse_brush(raw: &str) -> Result<Aabb2, String> {
    let coords: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .map_err(|e| format!("invalid brush `{raw}`: {e}"))?;
    match coords.as_slice() {
        &[x0, y0, x1, y1] => Ok(Aabb2::from_corners([x0, y0], [x1, y1])),
        _ => Err(format!("brush needs 4 values, got {}", coords.len())),
    }
}

/// Events that bring a fresh dashboard to the requested snapshot.
pub fn snapshot_events(args: &SnapshotArgs, dashboard: &Dashboard) -> Result<Vec<Event>, String> {
    let mut events = vec![Event::SetVariable {
        variable: args.variable,
    }];
    if let Some(year) = args.year {
        let index = dashboard
            .dataset()
            .index_of_year(year)
            .ok_or_else(|| format!("year {year} is not in the dataset"))?;
        events.push(Event::SetYearIndex { index });
    }
    if let Some(rect) = args.brush {
        events.push(Event::BrushEnd { rect: Some(rect) });
    }
    if let Some(id) = &args.state {
        if dashboard.geography().get(id).is_none() {
            return Err(format!("unknown state id: {id}"));
        }
        events.push(Event::StateClicked { id: id.clone() });
    }
    Ok(events)
}

pub fn usage(exe: &str) -> String {
    format!(
        "Usage:\n  {exe} years <grid.csv>\n  {exe} snapshot <grid.csv> <geography.json> [--year Y] [--variable tas|pr] [--brush x0,y0,x1,y1] [--state ID] [--object NAME]\n\nNotes:\n- `snapshot` prints the rendered dashboard view as JSON.\n- Brush coordinates are map pixels for the default 960x600 layout.\n"
    )
}
