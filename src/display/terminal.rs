// src/display/terminal.rs
//! Terminal-based display implementation

use super::command::Command;
use crate::{
    error::Result,
    geo::{ClusterTier, GridSize},
    map::{MapScreen, MapType},
};
use crossterm::{
    cursor::MoveTo,
    queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{BufRead, Write};
use tracing::warn;

const RULE_WIDTH: usize = 64;

pub struct TerminalDisplay {
    clear_screen: bool,
}

impl TerminalDisplay {
    pub fn new() -> Self {
        Self { clear_screen: false }
    }

    /// Clear the terminal before every frame (interactive mode)
    pub fn clearing() -> Self {
        Self { clear_screen: true }
    }

    /// Read commands line by line and redraw after each one
    pub fn run(
        &self,
        screen: &mut MapScreen,
        input: impl BufRead,
        out: &mut impl Write,
    ) -> Result<()> {
        screen.focus();
        self.render(out, screen)?;
        writeln!(out, "{}", Command::help())?;
        self.prompt(out)?;

        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                self.prompt(out)?;
                continue;
            }

            match Command::parse(&line) {
                Ok(Command::Quit) => break,
                Ok(Command::Help) => writeln!(out, "{}", Command::help())?,
                Ok(command) => {
                    let status = Self::apply(screen, command);
                    self.render(out, screen)?;
                    if let Some(status) = status {
                        self.print_status(out, &status)?;
                    }
                }
                Err(message) => self.print_status(out, &message)?,
            }
            self.prompt(out)?;
        }

        screen.blur();
        writeln!(out)?;
        Ok(())
    }

    /// Apply one command, returning a status line for the user if any
    fn apply(screen: &mut MapScreen, command: Command) -> Option<String> {
        let outcome = match command {
            Command::Focus => {
                screen.focus();
                Ok(None)
            }
            Command::Blur => {
                screen.blur();
                Ok(None)
            }
            Command::Select(name) => screen.select_by_name(&name).map(|_| None),
            Command::Tap(name) => screen.tap_by_name(&name).map(|line| match line {
                Some(line) => Some(format!("Measured {:.2} km", line.distance_km)),
                None => Some("Select a marker and turn on measuring first".to_string()),
            }),
            Command::Measure => {
                let on = screen.toggle_measuring();
                Ok(Some(format!("Measuring {}", if on { "on" } else { "off" })))
            }
            Command::Map(map_type) => {
                screen.set_map_type(map_type);
                Ok(None)
            }
            Command::Radius(text) => {
                let km = screen.set_search_radius_text(&text);
                Ok(Some(format!("Search radius {} km", km)))
            }
            Command::Grid(degrees) => GridSize::new(degrees).map(|grid| {
                screen.set_grid_size(grid);
                screen.focus();
                Some(format!("Grid {}°: {} clusters", degrees, screen.clusters().len()))
            }),
            Command::Clear => {
                screen.clear_selection();
                Ok(None)
            }
            Command::Help | Command::Quit => Ok(None),
        };

        outcome.unwrap_or_else(|e| {
            warn!("{}", e);
            Some(e.to_string())
        })
    }

    /// Render the whole screen
    pub fn render(&self, out: &mut impl Write, screen: &MapScreen) -> Result<()> {
        if self.clear_screen {
            queue!(out, Clear(ClearType::All), MoveTo(0, 0))?;
        }

        self.render_header(out, screen)?;

        if !screen.is_visible() {
            queue!(out, Print("  (map hidden)\n\n"))?;
        } else {
            self.render_cluster_section(out, screen)?;
            self.render_selection_section(out, screen)?;
            self.render_nearby_section(out, screen)?;
        }

        queue!(
            out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(RULE_WIDTH)),
            Print("\n"),
            ResetColor
        )?;
        out.flush()?;
        Ok(())
    }

    fn render_header(&self, out: &mut impl Write, screen: &MapScreen) -> Result<()> {
        queue!(
            out,
            SetForegroundColor(Color::Green),
            Print("=".repeat(RULE_WIDTH)),
            Print("\nProperty Map\n"),
            Print("=".repeat(RULE_WIDTH)),
            Print("\n"),
            ResetColor
        )?;

        let tabs: Vec<String> = MapType::all()
            .iter()
            .map(|t| {
                if *t == screen.map_type() {
                    format!("[{}]", t.display_name())
                } else {
                    format!(" {} ", t.display_name())
                }
            })
            .collect();
        let region = screen.region();

        queue!(
            out,
            Print(format!("{}   Measure: {}\n", tabs.join(" "), if screen.is_measuring() { "on" } else { "off" })),
            Print(format!(
                "Region: {:.4}, {:.4} (span {}° x {}°)   Radius: {} km\n\n",
                region.latitude,
                region.longitude,
                region.latitude_delta,
                region.longitude_delta,
                screen.search_radius_km()
            ))
        )?;
        Ok(())
    }

    fn render_cluster_section(&self, out: &mut impl Write, screen: &MapScreen) -> Result<()> {
        queue!(
            out,
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "CLUSTERS ({} markers, {}° grid):\n",
                screen.markers().len(),
                screen.grid().degrees()
            )),
            ResetColor
        )?;

        if screen.clusters().is_empty() {
            queue!(out, Print("  No markers\n"))?;
        }

        for cluster in screen.clusters() {
            let tier = cluster.tier();
            queue!(
                out,
                Print(format!("  {:>9.4}, {:>9.4}  ", cluster.lat, cluster.lng)),
                SetForegroundColor(Self::tier_color(tier)),
                Print(format!("{:>4} {}", cluster.count, "●".repeat(cluster.count.min(20)))),
                ResetColor,
                Print("\n")
            )?;
        }

        queue!(out, Print("\n"))?;
        Ok(())
    }

    fn render_selection_section(&self, out: &mut impl Write, screen: &MapScreen) -> Result<()> {
        let Some(index) = screen.selected() else {
            return Ok(());
        };
        let callout = screen.callout(index)?;

        queue!(
            out,
            SetForegroundColor(Color::Cyan),
            Print("SELECTED:\n"),
            ResetColor,
            Print(format!("  {}\n", callout.title))
        )?;
        if let Some(marker) = screen.selected_marker() {
            queue!(out, Print(format!("  {}\n", marker.format_position())))?;
        }
        if let Some(distance) = callout.distance {
            queue!(out, Print(format!("  {}\n", distance)))?;
        }
        queue!(
            out,
            SetForegroundColor(Color::Blue),
            Print(format!("  {}\n\n", callout.hint)),
            ResetColor
        )?;
        Ok(())
    }

    fn render_nearby_section(&self, out: &mut impl Write, screen: &MapScreen) -> Result<()> {
        let Some(panel) = screen.nearby_panel() else {
            return Ok(());
        };

        queue!(
            out,
            SetForegroundColor(Color::Magenta),
            Print(format!("{}:\n", panel.title.to_uppercase())),
            ResetColor
        )?;
        for (name, distance) in &panel.rows {
            queue!(out, Print(format!("  {:<40} {:>14}\n", name, distance)))?;
        }
        queue!(out, Print("\n"))?;
        Ok(())
    }

    fn print_status(&self, out: &mut impl Write, message: &str) -> Result<()> {
        queue!(
            out,
            SetForegroundColor(Color::DarkYellow),
            Print(format!("» {}\n", message)),
            ResetColor
        )?;
        out.flush()?;
        Ok(())
    }

    fn prompt(&self, out: &mut impl Write) -> Result<()> {
        write!(out, "> ")?;
        out.flush()?;
        Ok(())
    }

    fn tier_color(tier: ClusterTier) -> Color {
        match tier {
            ClusterTier::High => Color::Red,
            ClusterTier::Medium => Color::DarkYellow,
            ClusterTier::Low => Color::Green,
        }
    }
}

impl Default for TerminalDisplay {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::MapConfig,
        geo::{Marker, MarkerSet},
    };

    fn screen() -> MapScreen {
        let markers = MarkerSet::new(vec![
            Marker::new("Makati Loft", 14.5547, 121.0244).unwrap(),
            Marker::new("Salcedo Studio", 14.5605, 121.0227).unwrap(),
            Marker::new("Cebu Suites", 10.3308, 123.9055).unwrap(),
        ])
        .unwrap();
        MapScreen::new(markers, &MapConfig::default()).unwrap()
    }

    fn rendered(screen: &MapScreen) -> String {
        let mut buf = Vec::new();
        TerminalDisplay::new().render(&mut buf, screen).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn test_render_hidden_before_focus() {
        let screen = screen();
        assert!(rendered(&screen).contains("(map hidden)"));
    }

    #[test]
    fn test_render_selection_and_nearby() {
        let mut screen = screen();
        screen.focus();
        screen.select(0).unwrap();

        let text = rendered(&screen);
        assert!(text.contains("CLUSTERS (3 markers"));
        assert!(text.contains("SELECTED:"));
        assert!(text.contains("NEARBY PROPERTIES (1)"));
        assert!(text.contains("Salcedo Studio"));
        assert!(text.contains("[Map]"));
    }

    #[test]
    fn test_interactive_session() {
        let mut screen = screen();
        let input = "select makati loft\nmeasure\ntap cebu suites\nmap satellite\nbogus\nquit\nselect nowhere\n";
        let mut out = Vec::new();

        TerminalDisplay::new()
            .run(&mut screen, input.as_bytes(), &mut out)
            .unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Measuring on"));
        assert!(text.contains("Measured "));
        assert!(text.contains("[Satellite]"));
        assert!(text.contains("unknown command 'bogus'"));
        assert!(!text.contains("Marker not found: nowhere"));
        assert_eq!(screen.selected(), Some(0));
        assert!(screen.distance_line().is_some());
        assert!(!screen.is_visible());
    }

    #[test]
    fn test_tap_with_measuring_off_reports_no_measurement() {
        let mut screen = screen();
        screen.select(0).unwrap();

        TerminalDisplay::apply(&mut screen, Command::Measure);
        let status = TerminalDisplay::apply(&mut screen, Command::Tap("Cebu Suites".to_string()));
        assert!(status.unwrap().starts_with("Measured "));

        TerminalDisplay::apply(&mut screen, Command::Measure);
        let status = TerminalDisplay::apply(&mut screen, Command::Tap("Salcedo Studio".to_string()));
        assert_eq!(status.unwrap(), "Select a marker and turn on measuring first");
    }

    #[test]
    fn test_grid_command_reclusters() {
        let mut screen = screen();
        screen.focus();
        assert_eq!(screen.clusters().len(), 2);

        let status = TerminalDisplay::apply(&mut screen, Command::Grid(0.001));
        assert_eq!(screen.clusters().len(), 3);
        assert!(status.unwrap().contains("3 clusters"));

        let status = TerminalDisplay::apply(&mut screen, Command::Grid(0.0));
        assert!(status.unwrap().starts_with("Invalid grid size"));
    }

    #[test]
    fn test_unknown_marker_reported_as_status() {
        let mut screen = screen();
        let status = TerminalDisplay::apply(&mut screen, Command::Select("Atlantis".to_string()));
        assert_eq!(status.unwrap(), "Marker not found: Atlantis");
    }
}
