use crate::data::model::{Cluster, ClusterDataset};
use crate::error::RejectedPartition;

// ---------------------------------------------------------------------------
// Cluster partition reading
// ---------------------------------------------------------------------------

/// Read a partition's clusters in the dataset's own order.
///
/// Each returned cluster carries the name from the partition's name list at
/// the same position. If the name list and the cluster list differ in
/// length, the whole partition is rejected.
pub fn read_partition(dataset: &ClusterDataset) -> Result<Vec<Cluster>, RejectedPartition> {
    let names = dataset.cluster_names();
    let clusters = dataset.clusters();

    if names.len() != clusters.len() {
        return Err(RejectedPartition::NameCountMismatch {
            names: names.len(),
            clusters: clusters.len(),
        });
    }

    Ok(clusters
        .iter()
        .zip(names)
        .map(|(cluster, name)| Cluster {
            name: name.clone(),
            color: cluster.color,
            indices: cluster.indices.clone(),
        })
        .collect())
}

/// Check that every member index addresses a point of a `num_points`-point
/// dataset. The first offending index rejects the partition.
pub fn check_indices(clusters: &[Cluster], num_points: usize) -> Result<(), RejectedPartition> {
    for cluster in clusters {
        if let Some(&index) = cluster.indices.iter().find(|&&i| i >= num_points) {
            return Err(RejectedPartition::IndexOutOfRange {
                cluster: cluster.name.clone(),
                index,
                num_points,
            });
        }
    }
    Ok(())
}
