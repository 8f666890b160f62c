// src/display/command.rs
//! Commands accepted by the interactive explorer

use crate::map::MapType;
use clap::ValueEnum;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Focus,
    Blur,
    Select(String),
    Tap(String),
    Measure,
    Map(MapType),
    Radius(String),
    Grid(f64),
    Clear,
    Help,
    Quit,
}

impl Command {
    /// Parse a line such as `select Makati Loft` or `radius 2.5`
    pub fn parse(line: &str) -> Result<Self, String> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };

        let needs_arg = |what: &str| -> Result<String, String> {
            if rest.is_empty() {
                Err(format!("'{}' needs {}", verb, what))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_lowercase().as_str() {
            "focus" | "refresh" => Ok(Command::Focus),
            "blur" => Ok(Command::Blur),
            "select" | "s" => Ok(Command::Select(needs_arg("a marker name")?)),
            "tap" | "t" => Ok(Command::Tap(needs_arg("a marker name")?)),
            "measure" | "m" => Ok(Command::Measure),
            "map" => {
                let name = needs_arg("a map type")?;
                MapType::from_str(&name, true)
                    .map(Command::Map)
                    .map_err(|_| format!("unknown map type '{}'", name))
            }
            // Radius text is parsed by the screen so bad input falls back to 1 km
            "radius" | "r" => Ok(Command::Radius(rest.to_string())),
            "grid" | "g" => {
                let raw = needs_arg("a cell size in degrees")?;
                raw.parse::<f64>()
                    .map(Command::Grid)
                    .map_err(|_| format!("invalid grid size '{}'", raw))
            }
            "clear" => Ok(Command::Clear),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{}'", other)),
        }
    }

    pub fn help() -> &'static str {
        "Commands:\n  \
         select <name>   show properties near a marker\n  \
         tap <name>      measure from the selection (when measuring)\n  \
         measure         toggle distance measurement\n  \
         map <type>      standard | satellite | hybrid | terrain\n  \
         radius <km>     set the search radius\n  \
         grid <degrees>  set the cluster cell size\n  \
         clear           drop the selection\n  \
         focus           recompute clusters\n  \
         quit            exit"
    }
}
