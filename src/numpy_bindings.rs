use numpy::{IntoPyArray, PyArray1, PyArray2, PyReadonlyArray1};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::wrap_pyfunction;

use crate::adjacency::{build_adjacency, AdjacencyResult};
use crate::config::{AdjacencyMode, MatrixConfig, MatrixLayout, DEFAULT_DENSE_BYTE_LIMIT};
use crate::contact_matrix::{pair_arms, rasterize_arms};
use crate::duplex_structs::{Interval, IntervalCollection};
use crate::error::Error;
use crate::region::region_mask;

fn to_py_err(e: Error) -> PyErr {
    PyValueError::new_err(e.to_string())
}

fn zip_intervals(starts: &[i64], ends: &[i64]) -> PyResult<Vec<Interval>> {
    if starts.len() != ends.len() {
        return Err(PyValueError::new_err(format!(
            "starts and ends differ in length ({} vs {})",
            starts.len(),
            ends.len()
        )));
    }
    Ok(starts
        .iter()
        .zip(ends.iter())
        .map(|(&s, &e)| Interval::new(s, e))
        .collect())
}

#[pyfunction]
#[pyo3(signature = (left_starts, left_ends, right_starts, right_ends, dense_byte_limit=None))]
pub fn contact_matrix_numpy(
    left_starts: PyReadonlyArray1<i64>,
    left_ends: PyReadonlyArray1<i64>,
    right_starts: PyReadonlyArray1<i64>,
    right_ends: PyReadonlyArray1<i64>,
    dense_byte_limit: Option<u64>,
    py: Python,
) -> PyResult<Py<PyArray2<u32>>> {
    let left = zip_intervals(left_starts.as_slice()?, left_ends.as_slice()?)?;
    let right = zip_intervals(right_starts.as_slice()?, right_ends.as_slice()?)?;
    let arms = pair_arms(&left, &right).map_err(to_py_err)?;

    let config = MatrixConfig::new(
        MatrixLayout::Dense,
        dense_byte_limit.unwrap_or(DEFAULT_DENSE_BYTE_LIMIT),
    );
    let matrix = rasterize_arms(&arms, &config).map_err(to_py_err)?;
    let dense = matrix.to_dense(&config).map_err(to_py_err)?;
    Ok(dense.into_pyarray(py).to_owned().into())
}

/// Returns `(idx, idx2, weight)` arrays, or `None` when no pair qualifies.
#[pyfunction]
#[pyo3(signature = (starts, ends, mode="nucleotide", cutoff=5.0))]
pub fn adjacency_numpy(
    starts: PyReadonlyArray1<i64>,
    ends: PyReadonlyArray1<i64>,
    mode: &str,
    cutoff: f64,
    py: Python,
) -> PyResult<Option<(Py<PyArray1<u64>>, Py<PyArray1<u64>>, Py<PyArray1<f64>>)>> {
    let mode: AdjacencyMode = mode.parse().map_err(PyValueError::new_err)?;
    let intervals = zip_intervals(starts.as_slice()?, ends.as_slice()?)?;
    let collection = IntervalCollection::new("gap", intervals);
    let config = MatrixConfig::new(MatrixLayout::Sparse, 0);
    let result = build_adjacency(&collection, mode, cutoff, &config).map_err(to_py_err)?;

    let AdjacencyResult::Matrix(matrix) = result else {
        return Ok(None);
    };
    let edges = matrix.edges();
    let idx: Vec<u64> = edges.iter().map(|e| e.idx as u64).collect();
    let idx2: Vec<u64> = edges.iter().map(|e| e.idx2 as u64).collect();
    let weight: Vec<f64> = edges.iter().map(|e| e.weight).collect();
    Ok(Some((
        idx.into_pyarray(py).to_owned().into(),
        idx2.into_pyarray(py).to_owned().into(),
        weight.into_pyarray(py).to_owned().into(),
    )))
}

#[pyfunction]
pub fn region_mask_numpy(
    left_starts: PyReadonlyArray1<i64>,
    left_ends: PyReadonlyArray1<i64>,
    right_starts: PyReadonlyArray1<i64>,
    right_ends: PyReadonlyArray1<i64>,
    left_window: (i64, i64),
    right_window: (i64, i64),
    py: Python,
) -> PyResult<Py<PyArray1<bool>>> {
    let left = zip_intervals(left_starts.as_slice()?, left_ends.as_slice()?)?;
    let right = zip_intervals(right_starts.as_slice()?, right_ends.as_slice()?)?;
    let lw = Interval::new(left_window.0, left_window.1);
    let rw = Interval::new(right_window.0, right_window.1);
    let mask = region_mask(&left, &right, lw, rw).map_err(to_py_err)?;
    Ok(mask.into_pyarray(py).to_owned().into())
}

#[pymodule]
fn duplexranges(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(contact_matrix_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(adjacency_numpy, m)?)?;
    m.add_function(wrap_pyfunction!(region_mask_numpy, m)?)?;
    Ok(())
}
