use std::path::Path;

use geo::Coord;

use crate::error::{ConstructError, Result};

use super::{area::AreaType, set::Contour};

/// Two vertices closer than this (degrees) are the same vertex.
const CLOSE_EPSILON: f64 = 1e-9;

/// Largest coordinate magnitude accepted, in degrees.
const MAX_LON: f64 = 360.0;
const MAX_LAT: f64 = 90.0;

/// One polygon record from a source file, before type resolution.
#[derive(Debug, Clone)]
pub(crate) struct PolyRecord {
    pub(crate) name: String,
    pub(crate) contours: Vec<Contour>,
}

impl PolyRecord {
    /// Resolve the declared feature name to an `AreaType`.
    pub(crate) fn area_type(&self) -> Result<AreaType> {
        AreaType::from_name(&self.name)
            .ok_or_else(|| ConstructError::Config(format!("unknown feature type '{}'", self.name)))
    }
}

/// Tokens of a polygon file with blank lines and `#` comments removed.
fn tokens(text: &str) -> impl Iterator<Item = &str> {
    text.lines()
        .map(|line| line.split('#').next().unwrap_or(""))
        .flat_map(str::split_whitespace)
}

/// Parse every polygon record in `text`. The whole file is rejected on the
/// first malformed contour.
pub(crate) fn parse_polys(text: &str, path: Option<&Path>) -> Result<Vec<PolyRecord>> {
    let fail = |message: String| ConstructError::format(path, message);

    let mut tokens = tokens(text);
    let mut next = |what: &str| tokens.next().ok_or_else(|| fail(format!("unexpected end of file reading {what}")));

    fn number<T: std::str::FromStr>(token: &str, what: &str) -> Result<T, String> {
        token.parse().map_err(|_| format!("cannot parse {what} from '{token}'"))
    }

    let mut records = Vec::new();
    loop {
        let name = match next("feature type") {
            Ok(name) => name.to_owned(),
            Err(_) => break,
        };

        // counts are untrusted: vectors grow with the data actually present
        let num_contours: usize = number(next("contour count")?, "contour count").map_err(fail)?;
        let mut contours = Vec::new();

        for j in 0..num_contours {
            let num_vertices: usize = number(next("vertex count")?, "vertex count").map_err(fail)?;
            let hole = match next("hole flag")? {
                "0" => false,
                "1" => true,
                other => return Err(fail(format!("hole flag must be 0 or 1, got '{other}'"))),
            };

            let mut points = Vec::new();
            for _ in 0..num_vertices {
                let x: f64 = number(next("x")?, "x").map_err(fail)?;
                let y: f64 = number(next("y")?, "y").map_err(fail)?;
                if !(x.abs() <= MAX_LON && y.abs() <= MAX_LAT) {
                    return Err(fail(format!("polygon '{name}' contour {j} has vertex ({x}, {y}) outside lon/lat range")));
                }
                points.push(Coord { x, y });
            }

            // drop the closing vertex when it repeats the opening one
            if points.len() > 1 {
                let (first, last) = (points[0], points[points.len() - 1]);
                if (first.x - last.x).abs() < CLOSE_EPSILON && (first.y - last.y).abs() < CLOSE_EPSILON {
                    points.pop();
                }
            }

            if points.len() < 3 {
                return Err(fail(format!(
                    "polygon '{name}' contour {j} has {} vertices, need at least 3", points.len(),
                )));
            }

            contours.push(Contour { points, hole });
        }

        records.push(PolyRecord { name, contours });
    }

    Ok(records)
}
