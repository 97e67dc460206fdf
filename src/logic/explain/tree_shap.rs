//! TreeSHAP - exact Shapley values for tree ensembles
//!
//! Path-dependent algorithm (Lundberg et al., "Consistent Individualized
//! Feature Attribution for Tree Ensembles", Algorithm 2). Node covers stand
//! in for the training distribution. Zero fractions are taken against the
//! sum of the two child covers so every split conserves mass and the
//! attributions add up exactly to `tree output - tree expectation`.

use crate::logic::model::{Tree, TreeEnsemble};

/// Marker for the root element, which carries no feature
const NO_FEATURE: usize = usize::MAX;

#[derive(Debug, Clone, Copy)]
struct PathElement {
    feature: usize,
    zero_fraction: f64,
    one_fraction: f64,
    pweight: f64,
}

/// Attributions for every feature of `x`, summed over all trees
///
/// Returns `Err` when a split node has no cover to weigh its branches.
pub fn ensemble_shap(ensemble: &TreeEnsemble, x: &[f64]) -> Result<Vec<f64>, String> {
    let mut phi = vec![0.0; ensemble.num_features()];
    for (i, tree) in ensemble.trees().iter().enumerate() {
        tree_shap(tree, x, &mut phi).map_err(|e| format!("tree {}: {}", i, e))?;
    }
    Ok(phi)
}

/// Add one tree's attributions for `x` into `phi`
pub fn tree_shap(tree: &Tree, x: &[f64], phi: &mut [f64]) -> Result<(), String> {
    recurse(tree, x, phi, 0, 0, &[], 1.0, 1.0, NO_FEATURE)
}

#[allow(clippy::too_many_arguments)]
fn recurse(
    tree: &Tree,
    x: &[f64],
    phi: &mut [f64],
    node_index: usize,
    mut unique_depth: usize,
    parent_path: &[PathElement],
    parent_zero_fraction: f64,
    parent_one_fraction: f64,
    parent_feature: usize,
) -> Result<(), String> {
    let mut path: Vec<PathElement> = parent_path[..unique_depth].to_vec();
    path.push(PathElement {
        feature: NO_FEATURE,
        zero_fraction: 0.0,
        one_fraction: 0.0,
        pweight: 0.0,
    });
    extend_path(&mut path, unique_depth, parent_zero_fraction, parent_one_fraction, parent_feature);

    let node = tree.node(node_index);
    let (left, right) = match (node.left, node.right) {
        (Some(l), Some(r)) => (l, r),
        _ => {
            for i in 1..=unique_depth {
                let w = unwound_path_sum(&path, unique_depth, i);
                let el = path[i];
                phi[el.feature] += w * (el.one_fraction - el.zero_fraction) * node.value;
            }
            return Ok(());
        }
    };

    let hot = node.next(x[node.feature]).unwrap_or(left);
    let cold = if hot == left { right } else { left };

    let (hot_cover, cold_cover) = (tree.node(hot).cover, tree.node(cold).cover);
    let total = hot_cover + cold_cover;
    if total.is_nan() || total <= 0.0 {
        return Err(format!("split node {} has no cover", node_index));
    }

    let mut incoming_zero_fraction = 1.0;
    let mut incoming_one_fraction = 1.0;

    // Feature already on the path: undo that split and redo it here
    if let Some(path_index) = (0..=unique_depth).find(|&i| path[i].feature == node.feature) {
        incoming_zero_fraction = path[path_index].zero_fraction;
        incoming_one_fraction = path[path_index].one_fraction;
        unwind_path(&mut path, unique_depth, path_index);
        unique_depth -= 1;
    }

    recurse(
        tree, x, phi, hot, unique_depth + 1, &path,
        hot_cover / total * incoming_zero_fraction, incoming_one_fraction, node.feature,
    )?;
    recurse(
        tree, x, phi, cold, unique_depth + 1, &path,
        cold_cover / total * incoming_zero_fraction, 0.0, node.feature,
    )
}

fn extend_path(
    path: &mut [PathElement],
    unique_depth: usize,
    zero_fraction: f64,
    one_fraction: f64,
    feature: usize,
) {
    path[unique_depth] = PathElement {
        feature,
        zero_fraction,
        one_fraction,
        pweight: if unique_depth == 0 { 1.0 } else { 0.0 },
    };

    let depth_plus_one = (unique_depth + 1) as f64;
    for i in (0..unique_depth).rev() {
        path[i + 1].pweight += one_fraction * path[i].pweight * (i + 1) as f64 / depth_plus_one;
        path[i].pweight = zero_fraction * path[i].pweight * (unique_depth - i) as f64 / depth_plus_one;
    }
}

fn unwind_path(path: &mut [PathElement], unique_depth: usize, path_index: usize) {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let depth_plus_one = (unique_depth + 1) as f64;
    let mut next_one_portion = path[unique_depth].pweight;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = path[i].pweight;
            path[i].pweight = next_one_portion * depth_plus_one / ((i + 1) as f64 * one_fraction);
            next_one_portion =
                tmp - path[i].pweight * zero_fraction * (unique_depth - i) as f64 / depth_plus_one;
        } else {
            path[i].pweight =
                path[i].pweight * depth_plus_one / (zero_fraction * (unique_depth - i) as f64);
        }
    }

    for i in path_index..unique_depth {
        path[i].feature = path[i + 1].feature;
        path[i].zero_fraction = path[i + 1].zero_fraction;
        path[i].one_fraction = path[i + 1].one_fraction;
    }
}

fn unwound_path_sum(path: &[PathElement], unique_depth: usize, path_index: usize) -> f64 {
    let one_fraction = path[path_index].one_fraction;
    let zero_fraction = path[path_index].zero_fraction;
    let depth_plus_one = (unique_depth + 1) as f64;
    let mut next_one_portion = path[unique_depth].pweight;
    let mut total = 0.0;

    for i in (0..unique_depth).rev() {
        if one_fraction != 0.0 {
            let tmp = next_one_portion * depth_plus_one / ((i + 1) as f64 * one_fraction);
            total += tmp;
            next_one_portion =
                path[i].pweight - tmp * zero_fraction * (unique_depth - i) as f64 / depth_plus_one;
        } else if zero_fraction != 0.0 {
            total += path[i].pweight / zero_fraction / ((unique_depth - i) as f64 / depth_plus_one);
        }
    }

    total
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::model::{Node, Objective};

    fn stump(feature: usize, threshold: f32, left: f64, right: f64, cl: f64, cr: f64) -> Tree {
        Tree::new(
            vec![
                Node::split(feature, threshold, 1, 2, cl + cr, 1.0),
                Node::leaf(left, cl),
                Node::leaf(right, cr),
            ],
            2,
        )
        .unwrap()
    }

    #[test]
    fn test_stump_attribution() {
        // E = (30 * -1 + 70 * 1) / 100 = 0.4; x goes left: f = -1
        let tree = stump(0, 0.5, -1.0, 1.0, 30.0, 70.0);
        let mut phi = vec![0.0; 2];
        tree_shap(&tree, &[0.0, 9.0], &mut phi).unwrap();

        assert!((phi[0] - (-1.4)).abs() < 1e-12);
        assert_eq!(phi[1], 0.0);
    }

    /// Exact Shapley values for f(x) = [x0 >= .5] AND [x1 >= .5] on a balanced tree
    #[test]
    fn test_interaction_split_evenly() {
        let tree = Tree::new(
            vec![
                Node::split(0, 0.5, 1, 2, 4.0, 1.0),
                Node::leaf(0.0, 2.0),
                Node::split(1, 0.5, 3, 4, 2.0, 1.0),
                Node::leaf(0.0, 1.0),
                Node::leaf(1.0, 1.0),
            ],
            2,
        )
        .unwrap();
        let mut phi = vec![0.0; 2];
        tree_shap(&tree, &[1.0, 1.0], &mut phi).unwrap();

        // f = 1, E = 0.25: both features share 0.75 equally
        assert!((phi[0] - 0.375).abs() < 1e-12);
        assert!((phi[1] - 0.375).abs() < 1e-12);
    }

    #[test]
    fn test_repeated_feature_on_path() {
        let tree = Tree::new(
            vec![
                Node::split(0, 5.0, 1, 2, 10.0, 1.0),
                Node::split(0, 2.0, 3, 4, 6.0, 1.0),
                Node::leaf(3.0, 4.0),
                Node::leaf(-2.0, 1.0),
                Node::leaf(1.0, 5.0),
            ],
            2,
        )
        .unwrap();
        let x = [3.0, 0.0];
        let mut phi = vec![0.0; 2];
        tree_shap(&tree, &x, &mut phi).unwrap();

        // Single feature: phi = f(x) - E
        let expected = tree.predict(&x) - tree.expected_value();
        assert!((phi[0] - expected).abs() < 1e-12);
        assert_eq!(phi[1], 0.0);
    }

    #[test]
    fn test_ensemble_local_accuracy() {
        let trees = vec![
            stump(0, 0.5, -1.0, 1.0, 30.0, 70.0),
            stump(1, 2.0, 0.3, -0.2, 55.0, 45.0),
        ];
        let ensemble = TreeEnsemble::new(trees, 0.3, Objective::BinaryLogistic, 2, vec![]);

        for x in [[0.0, 0.0], [1.0, 3.0], [0.2, 5.0]] {
            let phi = ensemble_shap(&ensemble, &x).unwrap();
            let reconstructed = ensemble.expected_margin() + phi.iter().sum::<f64>();
            assert!((reconstructed - ensemble.margin(&x)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_zero_cover_split_is_an_error() {
        let tree = stump(0, 0.5, -1.0, 1.0, 0.0, 0.0);
        let mut phi = vec![0.0; 2];
        assert!(tree_shap(&tree, &[0.0, 0.0], &mut phi).is_err());
    }
}
