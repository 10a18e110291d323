//! Yee grid storage and the TMz update equations.
//!
//! In normalised units Maxwell's curl equations for the TMz polarisation
//! read
//!
//! $$\mu \partial_t H_x = -\partial_y E_z, \qquad
//!   \mu \partial_t H_y = \partial_x E_z, \qquad
//!   \epsilon \partial_t E_z + \sigma E_z = \partial_x H_y - \partial_y H_x - J_z.$$
//!
//! $E_z$ is sampled at cell centres, $H_x$ on the upper face and $H_y$ on
//! the right face of each cell. The outermost $E_z$ samples on all four
//! sides are held at zero, so the domain is closed by electric walls half a
//! cell inside the cell boundary, placed the same way on every side.

use ndarray::{Array2, Zip};

use super::pml::CpmlAxis;

/// Field arrays, update coefficients, and CPML state for one simulation.
pub(crate) struct YeeGrid {
    pub nx: usize,
    pub ny: usize,
    pub dx: f64,
    pub dt: f64,

    pub ez: Array2<f64>,
    pub hx: Array2<f64>,
    pub hy: Array2<f64>,

    /// $E_z$ self-coefficient $(1 - \sigma\Delta t/2\epsilon)/(1 + \sigma\Delta t/2\epsilon)$.
    pub ca: Array2<f64>,
    /// $E_z$ curl coefficient $(\Delta t/\epsilon)/(1 + \sigma\Delta t/2\epsilon)$.
    pub cb: Array2<f64>,
    /// $\Delta t/\mu$ at the $H_x$ and $H_y$ sample points.
    pub dh_x: Array2<f64>,
    pub dh_y: Array2<f64>,

    eps: Array2<f64>,
    mu_x: Array2<f64>,
    mu_y: Array2<f64>,

    pub pml_x: CpmlAxis,
    pub pml_y: CpmlAxis,
    psi_ez_x: Array2<f64>,
    psi_ez_y: Array2<f64>,
    psi_hx_y: Array2<f64>,
    psi_hy_x: Array2<f64>,
}

impl YeeGrid {
    /// Build a grid from material maps sampled on the three sub-grids.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        dx: f64,
        dt: f64,
        epsilon: &Array2<f64>,
        conductivity: &Array2<f64>,
        mu_x: &Array2<f64>,
        mu_y: &Array2<f64>,
        pml_x: CpmlAxis,
        pml_y: CpmlAxis,
    ) -> Self {
        let (nx, ny) = epsilon.dim();

        let mut ca = Array2::<f64>::zeros((nx, ny));
        let mut cb = Array2::<f64>::zeros((nx, ny));
        Zip::from(&mut ca)
            .and(&mut cb)
            .and(epsilon)
            .and(conductivity)
            .for_each(|ca, cb, &eps, &sigma| {
                let loss = sigma * dt / (2.0 * eps);
                *ca = (1.0 - loss) / (1.0 + loss);
                *cb = (dt / eps) / (1.0 + loss);
            });

        Self {
            nx,
            ny,
            dx,
            dt,
            ez: Array2::zeros((nx, ny)),
            hx: Array2::zeros((nx, ny)),
            hy: Array2::zeros((nx, ny)),
            ca,
            cb,
            dh_x: mu_x.mapv(|mu| dt / mu),
            dh_y: mu_y.mapv(|mu| dt / mu),
            eps: epsilon.clone(),
            mu_x: mu_x.clone(),
            mu_y: mu_y.clone(),
            pml_x,
            pml_y,
            psi_ez_x: Array2::zeros((nx, ny)),
            psi_ez_y: Array2::zeros((nx, ny)),
            psi_hx_y: Array2::zeros((nx, ny)),
            psi_hy_x: Array2::zeros((nx, ny)),
        }
    }

    /// Advance $H$ by one timestep from the current $E_z$.
    pub fn update_h(&mut self) {
        let inv_dx = 1.0 / self.dx;
        let (nx, ny) = (self.nx, self.ny);
        let ez = &self.ez;
        let pml_x = &self.pml_x;
        let pml_y = &self.pml_y;

        // Hx -= dt/mu * dEz/dy
        Zip::indexed(&mut self.hx)
            .and(&mut self.psi_hx_y)
            .and(&self.dh_x)
            .par_for_each(|(i, j), hx, psi, &coef| {
                let next = if j + 1 < ny { ez[[i, j + 1]] } else { 0.0 };
                let d_ez = (next - ez[[i, j]]) * inv_dx;
                *psi = pml_y.b_h[j] * *psi + pml_y.a_h[j] * d_ez;
                *hx -= coef * (d_ez / pml_y.kappa_h[j] + *psi);
            });

        // Hy += dt/mu * dEz/dx
        Zip::indexed(&mut self.hy)
            .and(&mut self.psi_hy_x)
            .and(&self.dh_y)
            .par_for_each(|(i, j), hy, psi, &coef| {
                let next = if i + 1 < nx { ez[[i + 1, j]] } else { 0.0 };
                let d_ez = (next - ez[[i, j]]) * inv_dx;
                *psi = pml_x.b_h[i] * *psi + pml_x.a_h[i] * d_ez;
                *hy += coef * (d_ez / pml_x.kappa_h[i] + *psi);
            });
    }

    /// Advance $E_z$ by one timestep from the current $H$ (sources excluded).
    pub fn update_e(&mut self) {
        let inv_dx = 1.0 / self.dx;
        let hx = &self.hx;
        let hy = &self.hy;
        let ca = &self.ca;
        let cb = &self.cb;
        let pml_x = &self.pml_x;
        let pml_y = &self.pml_y;
        let (nx, ny) = (self.nx, self.ny);

        Zip::indexed(&mut self.ez)
            .and(&mut self.psi_ez_x)
            .and(&mut self.psi_ez_y)
            .par_for_each(|(i, j), ez, psi_x, psi_y| {
                if is_wall(i, j, nx, ny) {
                    *ez = 0.0;
                    return;
                }
                let d_hy = (hy[[i, j]] - hy[[i - 1, j]]) * inv_dx;
                let d_hx = (hx[[i, j]] - hx[[i, j - 1]]) * inv_dx;

                *psi_x = pml_x.b_e[i] * *psi_x + pml_x.a_e[i] * d_hy;
                *psi_y = pml_y.b_e[j] * *psi_y + pml_y.a_e[j] * d_hx;

                let curl = (d_hy / pml_x.kappa_e[i] + *psi_x) - (d_hx / pml_y.kappa_e[j] + *psi_y);
                *ez = ca[[i, j]] * *ez + cb[[i, j]] * curl;
            });
    }

    /// Add a current density $J_z$ at node `(i, j)` for the step just taken.
    ///
    /// Currents on the wall nodes have no effect.
    pub fn inject_current(&mut self, i: usize, j: usize, current_density: f64) {
        if !is_wall(i, j, self.nx, self.ny) {
            self.ez[[i, j]] -= self.cb[[i, j]] * current_density;
        }
    }

    /// Electromagnetic energy $\tfrac12\sum(\epsilon E_z^2 + \mu H^2)\,\Delta x^2$.
    pub fn energy(&self) -> f64 {
        let weighted_sq = |field: &Array2<f64>, weight: &Array2<f64>| -> f64 {
            Zip::from(field)
                .and(weight)
                .fold(0.0, |acc, &f, &w| acc + w * f * f)
        };
        let total = weighted_sq(&self.ez, &self.eps)
            + weighted_sq(&self.hx, &self.mu_x)
            + weighted_sq(&self.hy, &self.mu_y);
        0.5 * total * self.dx * self.dx
    }

    /// Reset all fields and auxiliary CPML state to zero.
    pub fn clear(&mut self) {
        for a in [
            &mut self.ez,
            &mut self.hx,
            &mut self.hy,
            &mut self.psi_ez_x,
            &mut self.psi_ez_y,
            &mut self.psi_hx_y,
            &mut self.psi_hy_x,
        ] {
            a.fill(0.0);
        }
    }
}

/// Whether `(i, j)` is one of the $E_z$ samples pinned to zero.
fn is_wall(i: usize, j: usize, nx: usize, ny: usize) -> bool {
    i == 0 || j == 0 || i + 1 >= nx || j + 1 >= ny
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn vacuum_grid(n: usize, dx: f64, dt: f64) -> YeeGrid {
        let ones = Array2::<f64>::ones((n, n));
        let zeros = Array2::<f64>::zeros((n, n));
        YeeGrid::new(
            dx,
            dt,
            &ones,
            &zeros,
            &ones,
            &ones,
            CpmlAxis::new(n, dx, dt, None),
            CpmlAxis::new(n, dx, dt, None),
        )
    }

    #[test]
    fn test_coefficients_lossless() {
        let grid = vacuum_grid(4, 0.1, 0.05);
        assert!(grid.ca.iter().all(|&c| c == 1.0));
        assert!(grid.cb.iter().all(|&c| (c - 0.05).abs() < 1e-15));
        assert!(grid.dh_x.iter().all(|&c| (c - 0.05).abs() < 1e-15));
    }

    #[test]
    fn test_energy_of_single_cell() {
        let mut grid = vacuum_grid(4, 0.1, 0.05);
        grid.ez[[1, 1]] = 2.0;
        // 0.5 * eps * E^2 * dx^2
        assert_relative_eq!(grid.energy(), 0.5 * 4.0 * 0.01, epsilon = 1e-12);
    }

    #[test]
    fn test_closed_cavity_conserves_energy() {
        // Lossless cavity with electric walls: energy oscillates between E and
        // H but stays bounded near its initial value.
        let mut grid = vacuum_grid(32, 0.1, 0.05);
        grid.ez[[16, 16]] = 1.0;
        let initial = grid.energy();
        let mut max_ratio: f64 = 0.0;
        for _ in 0..400 {
            grid.update_h();
            grid.update_e();
            max_ratio = max_ratio.max(grid.energy() / initial);
        }
        assert!(max_ratio < 2.0, "energy grew by {max_ratio}");
        assert!(grid.ez.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_pulse_spreads_symmetrically() {
        let mut grid = vacuum_grid(21, 0.1, 0.05);
        grid.ez[[10, 10]] = 1.0;
        for _ in 0..3 {
            grid.update_h();
            grid.update_e();
        }
        assert_relative_eq!(grid.ez[[7, 10]], grid.ez[[13, 10]], epsilon = 1e-12);
        assert_relative_eq!(grid.ez[[10, 7]], grid.ez[[10, 13]], epsilon = 1e-12);
        assert_relative_eq!(grid.ez[[7, 10]], grid.ez[[10, 7]], epsilon = 1e-12);
    }

    #[test]
    fn test_walls_are_mirror_images() {
        // An off-centre pulse and its mirror image must evolve into mirror
        // images of each other, including after reflecting off the walls.
        let n = 12;
        let mut grid = vacuum_grid(n, 0.1, 0.05);
        let mut mirrored = vacuum_grid(n, 0.1, 0.05);
        grid.ez[[3, 4]] = 1.0;
        mirrored.ez[[n - 1 - 3, n - 1 - 4]] = 1.0;
        for _ in 0..120 {
            for g in [&mut grid, &mut mirrored] {
                g.update_h();
                g.update_e();
            }
        }
        let peak = grid.ez.iter().fold(0.0_f64, |m, v| m.max(v.abs()));
        assert!(peak > 0.0);
        for i in 0..n {
            for j in 0..n {
                assert_relative_eq!(
                    grid.ez[[i, j]],
                    mirrored.ez[[n - 1 - i, n - 1 - j]],
                    epsilon = 1e-12 * peak
                );
            }
        }
    }

    #[test]
    fn test_wall_nodes_stay_zero() {
        let n = 10;
        let mut grid = vacuum_grid(n, 0.1, 0.05);
        grid.ez[[1, 1]] = 1.0;
        grid.inject_current(0, 5, 3.0);
        grid.inject_current(5, n - 1, 3.0);
        for _ in 0..30 {
            grid.update_h();
            grid.update_e();
        }
        for k in 0..n {
            for (i, j) in [(0, k), (n - 1, k), (k, 0), (k, n - 1)] {
                assert_eq!(grid.ez[[i, j]], 0.0, "wall node ({i}, {j})");
            }
        }
        assert!(grid.ez[[2, 2]] != 0.0);
    }

    #[test]
    fn test_clear() {
        let mut grid = vacuum_grid(8, 0.1, 0.05);
        grid.ez[[3, 3]] = 1.0;
        grid.update_h();
        grid.update_e();
        grid.clear();
        assert_eq!(grid.energy(), 0.0);
    }
}
