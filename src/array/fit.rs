use crate::error::Result;

use super::Array;

/// Least-squares line `y = m * x + b` through `xs`/`ys`.
fn least_squares(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let (sum_x, sum_y) = (xs.iter().sum::<f64>(), ys.iter().sum::<f64>());
    let sum_xx = xs.iter().map(|x| x * x).sum::<f64>();
    let sum_xy = xs.iter().zip(ys).map(|(x, y)| x * y).sum::<f64>();

    let denom = n * sum_xx - sum_x * sum_x;
    if denom.abs() < f64::EPSILON { return (0.0, sum_y / n) }

    let m = (n * sum_xy - sum_x * sum_y) / denom;
    let b = (sum_y - m * sum_x) / n;
    (m, b)
}

/// Largest squared residual of the line `m, b` over the points.
fn max_squared_error(xs: &[f64], ys: &[f64], m: f64, b: f64) -> f64 {
    xs.iter().zip(ys)
        .map(|(x, y)| { let e = y - (m * x + b); e * e })
        .fold(0.0, f64::max)
}

impl Array {
    /// Reduce the grid to a sparse point set that approximates the surface to
    /// within `tolerance` meters.
    ///
    /// Each row is swept west to east, greedily growing a least-squares line
    /// segment until its worst residual exceeds the tolerance. A fit point is
    /// emitted at every junction between consecutive segments, at the mean of
    /// the two segments' heights there. The four grid corners are always kept
    /// in the corner set. `max_nodes` caps the number of fit points.
    ///
    /// Fails when the samples have not been parsed yet.
    pub fn fit(&mut self, tolerance: f64, max_nodes: Option<usize>) -> Result<()> {
        self.check_grid()?;
        let error_sq = tolerance * tolerance;
        let (last_col, last_row) = (self.cols - 1, self.rows - 1);

        self.corner_nodes = vec![
            self.node(0, 0, self.sample(0, 0)),
            self.node(last_col, 0, self.sample(last_col, 0)),
            self.node(last_col, last_row, self.sample(last_col, last_row)),
            self.node(0, last_row, self.sample(0, last_row)),
        ];
        self.fit_nodes.clear();

        log::debug!("  fitting region = 0,0 to {last_col},{last_row}");

        let xs = (0..self.cols).map(|c| c as f64 * self.col_step).collect::<Vec<_>>();
        let mut ys = vec![0.0; self.cols];

        'rows: for row in 0..self.rows {
            for (col, y) in ys.iter_mut().enumerate() { *y = self.sample(col, row); }

            let mut start = 0;
            let mut last_y: Option<f64> = None;
            while start < last_col {
                let mut end = start + 1;
                while end < last_col {
                    let (m, b) = least_squares(&xs[start..=end + 1], &ys[start..=end + 1]);
                    if max_squared_error(&xs[start..=end + 1], &ys[start..=end + 1], m, b) > error_sq { break }
                    end += 1;
                }

                let (m, b) = least_squares(&xs[start..=end], &ys[start..=end]);
                if let Some(prev) = last_y {
                    if max_nodes.is_some_and(|max| self.fit_nodes.len() >= max) {
                        log::warn!("fit node budget of {} reached at row {row}", self.fit_nodes.len());
                        break 'rows;
                    }
                    let here = m * xs[start] + b;
                    self.fit_nodes.push(self.node(start, row, 0.5 * (prev + here)));
                }

                last_y = Some(m * xs[end] + b);
                start = end;
            }
        }

        log::info!("  fit {} nodes ({} corners) from {}x{} grid",
            self.fit_nodes.len(), self.corner_nodes.len(), self.cols, self.rows);
        Ok(())
    }
}
