use crate::{error::MeshingError, misc::FloatingPoint};

/// Maps depths linearly onto element sizes in `[min_size, max_size]`,
/// the shallowest point getting `min_size` and the deepest `max_size`.
///
/// A field without depth variation gets `min_size` everywhere.
/// ```
/// use quadro::prelude::size_function_from_depth;
///
/// let sizes = size_function_from_depth(&[0., 5., 10., 20., 25., 5., 0.], 2., 102.).unwrap();
/// assert_eq!(sizes, vec![2., 22., 42., 82., 102., 22., 2.]);
/// ```
pub fn size_function_from_depth<T: FloatingPoint>(
    depths: &[T],
    min_size: T,
    max_size: T,
) -> anyhow::Result<Vec<T>> {
    anyhow::ensure!(
        !depths.is_empty(),
        MeshingError::InvalidInput("no depths to build sizes from".to_string())
    );
    anyhow::ensure!(
        min_size > T::zero(),
        MeshingError::invalid_parameter("min_size", min_size, "must be positive")
    );
    anyhow::ensure!(
        max_size > min_size,
        MeshingError::invalid_parameter("max_size", max_size, "must be greater than min_size")
    );

    let (shallowest, deepest) = depths
        .iter()
        .fold((depths[0], depths[0]), |(lo, hi), d| (lo.min(*d), hi.max(*d)));
    let range = deepest - shallowest;
    if range <= T::zero() {
        return Ok(vec![min_size; depths.len()]);
    }

    let span = max_size - min_size;
    Ok(depths
        .iter()
        .map(|d| min_size + (*d - shallowest) / range * span)
        .collect())
}
