compute::criterion_benchmark!(compute_naive);
