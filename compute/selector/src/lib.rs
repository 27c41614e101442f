//! Pick the best compute backend allowed by enabled crate features, expose it
//! as a Simulation typedef.

cfg_if::cfg_if! {
    if #[cfg(feature = "compute_parallel")] {
        pub type Simulation = compute_parallel::Simulation;
    } else if #[cfg(feature = "compute_regular")] {
        pub type Simulation = compute_regular::Simulation;
    } else if #[cfg(any(feature = "compute_naive", test))] {
        pub type Simulation = compute_naive::Simulation;
    } else {
        // If no backend was specified, use a backend skeleton that throws a
        // minimal number of compiler errors.
        use compute::{Error, NoArgs, Simulate, SimulateBase, SimulateCreate};
        use data::{field::Evolving, grid::Grid, parameters::Parameters, Precision};
        //
        pub struct Simulation(Grid);
        //
        impl SimulateBase for Simulation {
            type CliArgs = NoArgs;

            type Error = Error;

            fn grid(&self) -> &Grid {
                &self.0
            }
        }
        //
        impl SimulateCreate for Simulation {
            fn new(_params: Parameters, _args: NoArgs) -> Result<Self, Error> {
                std::compile_error!("Please enable at least one compute backend via crate features")
            }
        }
        //
        impl Simulate for Simulation {
            fn perform_steps(
                &self,
                _field: &mut Evolving,
                _dt: Precision,
                _steps: usize,
            ) -> Result<(), Error> {
                Ok(())
            }
        }
    }
}
