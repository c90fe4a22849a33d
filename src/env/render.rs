use super::{grid::AGENT, Grid, Pos};

/// Draw the grid inside a border, with the agent shown at `agent` if given
///
/// The grid itself is left as is.
pub fn grid_with_agent(grid: &Grid, agent: Option<Pos>) -> String {
    let border = format!(" {}", "-".repeat(grid.width()));
    let mut out = String::with_capacity((grid.width() + 3) * (grid.height() + 2));

    out.push_str(&border);
    out.push('\n');
    for (y, row) in grid.rows().enumerate() {
        out.push('|');
        out.extend(row.iter().enumerate().map(|(x, &cell)| {
            if agent == Some((x as i32, y as i32)) {
                AGENT
            } else {
                cell
            }
        }));
        out.push_str("|\n");
    }
    out.push_str(&border);

    out
}
