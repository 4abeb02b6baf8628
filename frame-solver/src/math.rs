//! Mathematical utilities for FEA calculations

use crate::elements::SectionProperties;
use crate::error::{FEAError, FEAResult};
use nalgebra::{DMatrix, DVector, Matrix3, SMatrix, SVector};

pub type Mat = DMatrix<f64>;
pub type Vec = DVector<f64>;
pub type Mat3 = Matrix3<f64>;

/// 12x12 matrix for element stiffness and mass
pub type Mat12 = SMatrix<f64, 12, 12>;
/// 12-element vector for element forces/displacements
pub type Vec12 = SVector<f64, 12>;

/// Direction cosine matrix of a frame element
///
/// Rows are the local x, y, z axes in global coordinates. Local x runs from
/// the start node to the end node. For non-vertical elements local z lies
/// in the vertical plane through the element and points upward; vertical
/// elements take global Y as local y. `roll` rotates y and z about local x.
pub fn direction_cosines(i_node: &[f64; 3], j_node: &[f64; 3], roll: f64) -> FEAResult<Mat3> {
    let dx = j_node[0] - i_node[0];
    let dy = j_node[1] - i_node[1];
    let dz = j_node[2] - i_node[2];

    let length = (dx * dx + dy * dy + dz * dz).sqrt();

    if length < 1e-10 {
        return Err(FEAError::InvalidGeometry(format!(
            "zero-length element between {:?} and {:?}",
            i_node, j_node
        )));
    }

    let x = [dx / length, dy / length, dz / length];

    let (y, z) = if x[0].abs() < 1e-10 && x[1].abs() < 1e-10 {
        // Vertical element: y = global Y, z = x cross y
        let y = [0.0, 1.0, 0.0];
        let z = [-x[2], 0.0, x[0]];
        (y, z)
    } else {
        // z = Z - (Z.x) x, normalized
        let z_unnorm = [-x[2] * x[0], -x[2] * x[1], 1.0 - x[2] * x[2]];
        let z_len = (z_unnorm[0].powi(2) + z_unnorm[1].powi(2) + z_unnorm[2].powi(2)).sqrt();
        let z = [z_unnorm[0] / z_len, z_unnorm[1] / z_len, z_unnorm[2] / z_len];

        // y = z cross x
        let y = [
            z[1] * x[2] - z[2] * x[1],
            z[2] * x[0] - z[0] * x[2],
            z[0] * x[1] - z[1] * x[0],
        ];
        (y, z)
    };

    let (y, z) = if roll.abs() > 1e-10 {
        let (sin_r, cos_r) = roll.sin_cos();
        let y_rot = [
            y[0] * cos_r + z[0] * sin_r,
            y[1] * cos_r + z[1] * sin_r,
            y[2] * cos_r + z[2] * sin_r,
        ];
        let z_rot = [
            -y[0] * sin_r + z[0] * cos_r,
            -y[1] * sin_r + z[1] * cos_r,
            -y[2] * sin_r + z[2] * cos_r,
        ];
        (y_rot, z_rot)
    } else {
        (y, z)
    };

    Ok(Mat3::new(
        x[0], x[1], x[2],
        y[0], y[1], y[2],
        z[0], z[1], z[2],
    ))
}

/// Compute the 12x12 transformation matrix (global to local) for a frame element
pub fn member_transformation_matrix(
    i_node: &[f64; 3],
    j_node: &[f64; 3],
    roll: f64,
) -> FEAResult<Mat12> {
    let r = direction_cosines(i_node, j_node, roll)?;

    let mut t = Mat12::zeros();
    for block in 0..4 {
        let offset = block * 3;
        t.fixed_view_mut::<3, 3>(offset, offset).copy_from(&r);
    }

    Ok(t)
}

fn mirror_upper(m: &mut Mat12) {
    for i in 0..12 {
        for j in (i + 1)..12 {
            m[(j, i)] = m[(i, j)];
        }
    }
}

/// Compute the local stiffness matrix for a 3D frame element
///
/// With `shear` set, bending terms include Timoshenko shear deformation
/// through `Φ = 12EI / (G·As·L²)`. A zero shear area means no shear
/// deformation in that plane.
pub fn member_local_stiffness(section: &SectionProperties, length: f64, shear: bool) -> Mat12 {
    let SectionProperties {
        a,
        asy,
        asz,
        jx,
        iy,
        iz,
        e,
        g,
        ..
    } = *section;
    let l = length;
    let l2 = l * l;
    let l3 = l2 * l;

    let phi = |i: f64, area: f64| {
        if shear && area > 0.0 && g > 0.0 {
            12.0 * e * i / (g * area * l2)
        } else {
            0.0
        }
    };
    let phi_y = phi(iz, asy);
    let phi_z = phi(iy, asz);

    let mut k = Mat12::zeros();

    // Axial and torsion
    k[(0, 0)] = e * a / l;
    k[(0, 6)] = -e * a / l;
    k[(6, 6)] = e * a / l;
    k[(3, 3)] = g * jx / l;
    k[(3, 9)] = -g * jx / l;
    k[(9, 9)] = g * jx / l;

    // Bending in the local x-y plane (v, θz)
    let k1 = 12.0 * e * iz / (l3 * (1.0 + phi_y));
    let k2 = 6.0 * e * iz / (l2 * (1.0 + phi_y));
    let k3 = (4.0 + phi_y) * e * iz / (l * (1.0 + phi_y));
    let k4 = (2.0 - phi_y) * e * iz / (l * (1.0 + phi_y));
    k[(1, 1)] = k1;
    k[(1, 5)] = k2;
    k[(1, 7)] = -k1;
    k[(1, 11)] = k2;
    k[(5, 5)] = k3;
    k[(5, 7)] = -k2;
    k[(5, 11)] = k4;
    k[(7, 7)] = k1;
    k[(7, 11)] = -k2;
    k[(11, 11)] = k3;

    // Bending in the local x-z plane (w, θy)
    let k1 = 12.0 * e * iy / (l3 * (1.0 + phi_z));
    let k2 = 6.0 * e * iy / (l2 * (1.0 + phi_z));
    let k3 = (4.0 + phi_z) * e * iy / (l * (1.0 + phi_z));
    let k4 = (2.0 - phi_z) * e * iy / (l * (1.0 + phi_z));
    k[(2, 2)] = k1;
    k[(2, 4)] = -k2;
    k[(2, 8)] = -k1;
    k[(2, 10)] = -k2;
    k[(4, 4)] = k3;
    k[(4, 8)] = k2;
    k[(4, 10)] = k4;
    k[(8, 8)] = k1;
    k[(8, 10)] = k2;
    k[(10, 10)] = k3;

    mirror_upper(&mut k);
    k
}

/// Compute the geometric stiffness matrix for P-Delta analysis
///
/// # Arguments
/// * `p` - Axial force (positive = tension)
/// * `a` - Cross-sectional area
/// * `jx` - Torsional constant
/// * `length` - Element length
pub fn member_geometric_stiffness(p: f64, a: f64, jx: f64, length: f64) -> Mat12 {
    let mut kg = Mat12::zeros();
    if p.abs() < 1e-10 {
        return kg;
    }

    let l = length;
    let p_l = p / l;

    kg[(0, 0)] = p_l;
    kg[(0, 6)] = -p_l;
    kg[(6, 6)] = p_l;
    kg[(3, 3)] = p_l * jx / a;
    kg[(3, 9)] = -p_l * jx / a;
    kg[(9, 9)] = p_l * jx / a;

    kg[(1, 1)] = 6.0 * p_l / 5.0;
    kg[(1, 5)] = p / 10.0;
    kg[(1, 7)] = -6.0 * p_l / 5.0;
    kg[(1, 11)] = p / 10.0;
    kg[(5, 5)] = 2.0 * p * l / 15.0;
    kg[(5, 7)] = -p / 10.0;
    kg[(5, 11)] = -p * l / 30.0;
    kg[(7, 7)] = 6.0 * p_l / 5.0;
    kg[(7, 11)] = -p / 10.0;
    kg[(11, 11)] = 2.0 * p * l / 15.0;

    kg[(2, 2)] = 6.0 * p_l / 5.0;
    kg[(2, 4)] = -p / 10.0;
    kg[(2, 8)] = -6.0 * p_l / 5.0;
    kg[(2, 10)] = -p / 10.0;
    kg[(4, 4)] = 2.0 * p * l / 15.0;
    kg[(4, 8)] = p / 10.0;
    kg[(4, 10)] = -p * l / 30.0;
    kg[(8, 8)] = 6.0 * p_l / 5.0;
    kg[(8, 10)] = p / 10.0;
    kg[(10, 10)] = 2.0 * p * l / 15.0;

    mirror_upper(&mut kg);
    kg
}

/// Consistent mass matrix of a frame element in local coordinates
pub fn member_consistent_mass(rho: f64, a: f64, jx: f64, length: f64) -> Mat12 {
    let l = length;
    let l2 = l * l;
    let m = rho * a * l;
    let mt = rho * jx * l;
    let c = m / 420.0;

    let mut mass = Mat12::zeros();

    mass[(0, 0)] = m / 3.0;
    mass[(0, 6)] = m / 6.0;
    mass[(6, 6)] = m / 3.0;
    mass[(3, 3)] = mt / 3.0;
    mass[(3, 9)] = mt / 6.0;
    mass[(9, 9)] = mt / 3.0;

    mass[(1, 1)] = 156.0 * c;
    mass[(1, 5)] = 22.0 * l * c;
    mass[(1, 7)] = 54.0 * c;
    mass[(1, 11)] = -13.0 * l * c;
    mass[(5, 5)] = 4.0 * l2 * c;
    mass[(5, 7)] = 13.0 * l * c;
    mass[(5, 11)] = -3.0 * l2 * c;
    mass[(7, 7)] = 156.0 * c;
    mass[(7, 11)] = -22.0 * l * c;
    mass[(11, 11)] = 4.0 * l2 * c;

    mass[(2, 2)] = 156.0 * c;
    mass[(2, 4)] = -22.0 * l * c;
    mass[(2, 8)] = 54.0 * c;
    mass[(2, 10)] = 13.0 * l * c;
    mass[(4, 4)] = 4.0 * l2 * c;
    mass[(4, 8)] = -13.0 * l * c;
    mass[(4, 10)] = -3.0 * l2 * c;
    mass[(8, 8)] = 156.0 * c;
    mass[(8, 10)] = 22.0 * l * c;
    mass[(10, 10)] = 4.0 * l2 * c;

    mirror_upper(&mut mass);
    mass
}

/// Compute fixed end reactions for a uniformly distributed load
///
/// # Arguments
/// * `w` - Load intensity (force per unit length)
/// * `length` - Element length
/// * `direction` - Load direction index (0=x, 1=y, 2=z in local coords)
pub fn fer_uniform_load(w: f64, length: f64, direction: usize) -> Vec12 {
    let l = length;
    let l2 = l * l;

    let mut fer = Vec12::zeros();

    match direction {
        0 => {
            fer[0] = -w * l / 2.0;
            fer[6] = -w * l / 2.0;
        }
        1 => {
            fer[1] = -w * l / 2.0;
            fer[5] = -w * l2 / 12.0;
            fer[7] = -w * l / 2.0;
            fer[11] = w * l2 / 12.0;
        }
        2 => {
            fer[2] = -w * l / 2.0;
            fer[4] = w * l2 / 12.0;
            fer[8] = -w * l / 2.0;
            fer[10] = -w * l2 / 12.0;
        }
        _ => {}
    }

    fer
}

/// Solve a linear system using LU decomposition
pub fn solve_linear_system(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().lu().solve(b)
}

/// Solve a linear system using Cholesky decomposition (for symmetric positive definite)
pub fn solve_cholesky(a: &Mat, b: &Vec) -> Option<Vec> {
    a.clone().cholesky().map(|chol| chol.solve(b))
}
