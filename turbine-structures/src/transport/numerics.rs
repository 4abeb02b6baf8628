//! Sampled-curve helpers: interpolation, differentiation, integration

/// `n` evenly spaced values from `start` to `end` inclusive
pub fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Piecewise linear interpolation at `x`, clamped to the end values
///
/// `xp` must be increasing.
pub fn interp1(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    let j = xp[..n].partition_point(|&v| v <= x);
    let (x0, x1) = (xp[j - 1], xp[j]);
    let (f0, f1) = (fp[j - 1], fp[j]);
    if x1 == x0 {
        return f1;
    }
    f0 + (f1 - f0) * (x - x0) / (x1 - x0)
}

/// [`interp1`] at every point of `x`
pub fn interp(x: &[f64], xp: &[f64], fp: &[f64]) -> Vec<f64> {
    x.iter().map(|&xi| interp1(xi, xp, fp)).collect()
}

/// Derivative of sampled `f` over `x`
///
/// Second order central differences on the interior, first order one-sided
/// differences at both ends. Spacing may be uneven.
pub fn gradient(f: &[f64], x: &[f64]) -> Vec<f64> {
    let n = f.len().min(x.len());
    if n < 2 {
        return vec![0.0; n];
    }
    let mut g = vec![0.0; n];
    g[0] = (f[1] - f[0]) / (x[1] - x[0]);
    g[n - 1] = (f[n - 1] - f[n - 2]) / (x[n - 1] - x[n - 2]);
    for i in 1..n - 1 {
        let hs = x[i] - x[i - 1];
        let hd = x[i + 1] - x[i];
        g[i] = (hs * hs * f[i + 1] + (hd * hd - hs * hs) * f[i] - hd * hd * f[i - 1])
            / (hs * hd * (hd + hs));
    }
    g
}

/// Trapezoidal integral of `y` over `x`
pub fn trapz(y: &[f64], x: &[f64]) -> f64 {
    y.windows(2)
        .zip(x.windows(2))
        .map(|(y, x)| 0.5 * (y[0] + y[1]) * (x[1] - x[0]))
        .sum()
}

/// Trapezoidal integral from each station out to the last one
pub fn integrate_from_tip(y: &[f64], x: &[f64]) -> Vec<f64> {
    let n = y.len().min(x.len());
    let mut out = vec![0.0; n];
    for i in (0..n.saturating_sub(1)).rev() {
        out[i] = out[i + 1] + 0.5 * (y[i] + y[i + 1]) * (x[i + 1] - x[i]);
    }
    out
}

/// Cumulative length along the polyline (x, y), starting at zero
pub fn arc_length(x: &[f64], y: &[f64]) -> Vec<f64> {
    let mut arc = Vec::with_capacity(x.len());
    let mut total = 0.0;
    for i in 0..x.len().min(y.len()) {
        if i > 0 {
            total += (x[i] - x[i - 1]).hypot(y[i] - y[i - 1]);
        }
        arc.push(total);
    }
    arc
}

/// Index of the value nearest `target` in a non-decreasing slice
///
/// Ties go to the lowest index.
pub fn nearest_sorted(values: &[f64], target: f64) -> usize {
    if values.is_empty() {
        return 0;
    }
    let p = values.partition_point(|&v| v < target);
    let mut i = if p == 0 {
        0
    } else if p == values.len() {
        p - 1
    } else if (values[p - 1] - target).abs() <= (values[p] - target).abs() {
        p - 1
    } else {
        p
    };
    while i > 0 && values[i - 1] == values[i] {
        i -= 1;
    }
    i
}

/// Index of the value nearest `target` by linear scan; ties go to the
/// lowest index
pub fn nearest_linear(values: &[f64], target: f64) -> usize {
    let mut best = 0;
    let mut best_dist = f64::INFINITY;
    for (i, &v) in values.iter().enumerate() {
        let d = (v - target).abs();
        if d < best_dist {
            best = i;
            best_dist = d;
        }
    }
    best
}

pub fn is_non_decreasing(values: &[f64]) -> bool {
    values.windows(2).all(|w| w[0] <= w[1])
}
