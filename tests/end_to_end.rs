mod common;

use common::{same_clustering, three_blobs};
use meld::quality::{adjusted_rand_index, partition_coefficient, xie_beni_index};
use meld::{
    kernel, CancelToken, ClusterAlgorithm, ClusterConfig, Error, FuzzyCMeans, KMeans, KMedoids,
    KernelFuzzyCMeans, KernelKMeans, KernelPairwiseNearestNeighbour, KernelSvdKMeans,
    PairwiseNearestNeighbour, TruncatedSvd,
};

const CENTRES: [[f64; 2]; 3] = [[0.0, 0.0], [10.0, 0.0], [0.0, 10.0]];

#[test]
fn kmeans_recovers_three_blobs() {
    let (data, truth) = three_blobs(1);
    let fit = KMeans::new(ClusterConfig::new(42))
        .fit(data.view(), 3)
        .unwrap();

    assert!(fit.converged);
    assert!(fit.partition.is_hard());
    assert!(same_clustering(&fit.partition.labels(), &truth));
}

#[test]
fn fuzzy_cmeans_is_confident_near_centres() {
    let (data, _) = three_blobs(2);
    let fit = FuzzyCMeans::new(ClusterConfig::new(42))
        .fit(data.view(), 3)
        .unwrap();

    assert!(fit.converged);
    assert!(fit.partition.is_fuzzy(1e-9));

    let mut checked = 0;
    for (i, row) in data.rows().into_iter().enumerate() {
        let near_centre = CENTRES
            .iter()
            .any(|c| ((row[0] - c[0]).powi(2) + (row[1] - c[1]).powi(2)).sqrt() < 0.3);
        if near_centre {
            let dominant = fit.partition.memberships().row(i).fold(0.0f64, |a, &b| a.max(b));
            assert!(dominant > 0.9, "sample {i}: dominant membership {dominant}");
            checked += 1;
        }
    }
    assert!(checked > 0);

    assert!(partition_coefficient(&fit.partition) > 0.7);
    let xb = xie_beni_index(&fit.partition, fit.prototypes.view(), data.view(), 2.0).unwrap();
    assert!(xb < 0.1, "xie-beni {xb}");
}

#[test]
fn kmedoids_costs_never_increase_on_blobs() {
    let (data, _) = three_blobs(3);
    let fit = KMedoids::new(ClusterConfig::new(5))
        .fit(data.view(), 3)
        .unwrap();

    assert!(fit.partition.is_hard());
    assert_eq!(fit.medoids.len(), 3);
    for pair in fit.costs.windows(2) {
        assert!(pair[1] <= pair[0] + 1e-9);
    }
}

#[test]
fn pnn_to_one_cluster_has_single_root() {
    let (data, _) = three_blobs(4);
    let n = data.nrows();
    let fit = PairwiseNearestNeighbour::new(ClusterConfig::new(0))
        .fit(data.view(), 1)
        .unwrap();

    assert_eq!(fit.history.n_merges(), n - 1);
    let root = fit.history.root(0).unwrap();
    for i in 0..n {
        assert_eq!(fit.history.root(i).unwrap(), root);
    }
    assert_eq!(fit.history.merges().last().map(|m| m.size), Some(n));
}

#[test]
fn pnn_recovers_three_blobs() {
    let (data, truth) = three_blobs(5);
    let labels = PairwiseNearestNeighbour::new(ClusterConfig::new(0))
        .fit_predict(data.view(), 3)
        .unwrap();
    assert!((adjusted_rand_index(&labels, &truth) - 1.0).abs() < 1e-12);
}

#[test]
fn kernel_pnn_on_gaussian_kernel_recovers_blobs() {
    let (data, truth) = three_blobs(6);
    let gram = kernel::gaussian(data.view(), 3.0).unwrap();
    let labels = KernelPairwiseNearestNeighbour::new(ClusterConfig::new(0))
        .fit_predict(gram.view(), 3)
        .unwrap();
    assert!(same_clustering(&labels, &truth));
}

#[test]
fn kernel_kmeans_on_linear_kernel_matches_kmeans() {
    let (data, _) = three_blobs(7);
    let gram = kernel::linear(data.view());

    for seed in [1, 2, 3] {
        let feature = KMeans::new(ClusterConfig::new(seed))
            .fit(data.view(), 3)
            .unwrap();
        let kernelised = KernelKMeans::new(ClusterConfig::new(seed))
            .fit(gram.view(), 3)
            .unwrap();

        assert_eq!(feature.partition.labels(), kernelised.partition.labels());
        assert_eq!(feature.iterations, kernelised.iterations);
    }
}

#[cfg(feature = "svd")]
#[test]
fn svd_kmeans_with_exact_rank_matches_kernel_kmeans() {
    let (data, _) = three_blobs(8);
    let gram = kernel::linear(data.view());
    let svd = TruncatedSvd::from_kernel(gram.view(), 2).unwrap();

    let dense = KernelKMeans::new(ClusterConfig::new(11))
        .cluster(gram.view(), 3)
        .unwrap();
    let low_rank = KernelSvdKMeans::new(ClusterConfig::new(11))
        .cluster(&svd, 3)
        .unwrap();

    assert_eq!(dense.labels(), low_rank.labels());
}

#[test]
fn kernel_fcm_yields_fuzzy_partition() {
    let (data, truth) = three_blobs(9);
    let gram = kernel::linear(data.view());
    let fit = KernelFuzzyCMeans::new(ClusterConfig::new(13))
        .fit(gram.view(), 3)
        .unwrap();

    assert!(fit.partition.is_fuzzy(1e-9));
    assert_eq!(fit.prototypes.dim(), (data.nrows(), 3));
    assert!(same_clustering(&fit.partition.labels(), &truth));
}

#[test]
fn runs_are_bit_identical_for_equal_seeds() {
    let (data, _) = three_blobs(10);
    let config = ClusterConfig::new(99);

    let a = FuzzyCMeans::new(config.clone()).cluster(data.view(), 3).unwrap();
    let b = FuzzyCMeans::new(config.clone()).cluster(data.view(), 3).unwrap();
    assert_eq!(a, b);

    let a = KMedoids::new(config.clone()).cluster(data.view(), 3).unwrap();
    let b = KMedoids::new(config.clone()).cluster(data.view(), 3).unwrap();
    assert_eq!(a, b);

    #[cfg(feature = "svd")]
    {
        let gram = kernel::linear(data.view());
        let svd = TruncatedSvd::from_kernel(gram.view(), 2).unwrap();
        let a = KernelSvdKMeans::new(config.clone()).fit(&svd, 3).unwrap();
        let b = KernelSvdKMeans::new(config).fit(&svd, 3).unwrap();
        assert_eq!(a.partition, b.partition);
        assert_eq!(a.prototypes, b.prototypes);
    }
}

#[test]
fn cancelled_runs_stop_every_engine() {
    let (data, _) = three_blobs(11);
    let gram = kernel::linear(data.view());
    let token = CancelToken::new();
    token.cancel();
    let config = ClusterConfig::new(0).with_cancel_token(token);
    let cancelled = Err(Error::Cancelled { iterations: 0 });

    assert_eq!(
        KMeans::new(config.clone()).cluster(data.view(), 3),
        cancelled
    );
    assert_eq!(
        FuzzyCMeans::new(config.clone()).cluster(data.view(), 3),
        cancelled
    );
    assert_eq!(
        KMedoids::new(config.clone()).cluster(data.view(), 3),
        cancelled
    );
    assert_eq!(
        KernelKMeans::new(config.clone()).cluster(gram.view(), 3),
        cancelled
    );
    assert_eq!(
        KernelFuzzyCMeans::new(config.clone()).cluster(gram.view(), 3),
        cancelled
    );
    assert_eq!(
        PairwiseNearestNeighbour::new(config.clone()).cluster(data.view(), 3),
        cancelled
    );
    assert_eq!(
        KernelPairwiseNearestNeighbour::new(config.clone()).cluster(gram.view(), 3),
        cancelled
    );

    #[cfg(feature = "svd")]
    {
        let svd = TruncatedSvd::from_kernel(gram.view(), 2).unwrap();
        assert_eq!(KernelSvdKMeans::new(config).cluster(&svd, 3), cancelled);
    }
}

#[test]
fn invalid_inputs_are_rejected() {
    let (data, _) = three_blobs(12);
    let config = ClusterConfig::new(0);

    assert!(matches!(
        KMeans::new(config.clone()).fit(data.view(), 0),
        Err(Error::InvalidClusterCount { .. })
    ));
    assert!(matches!(
        PairwiseNearestNeighbour::new(config.clone()).fit(data.view(), data.nrows() + 1),
        Err(Error::InvalidClusterCount { .. })
    ));
    assert!(matches!(
        KernelKMeans::new(config.clone()).fit(data.view(), 2),
        Err(Error::DimensionMismatch { .. })
    ));
    assert!(matches!(
        FuzzyCMeans::new(config.with_epsilon(-1.0)).fit(data.view(), 2),
        Err(Error::InvalidParameter { .. })
    ));
}
