//! Batch evaluation of many element pairs.
use crate::accumulator::LinearizationAccumulator;
use crate::element::{IntElement, MortarElement};
use crate::intcell::Intcell;
use crate::integrator::{ContactIntegrator, MortarMatrices};
use crate::overlap::SegmentBounds;
use crate::settings::IntegratorSettings;
use crate::Real;
use eyre::WrapErr;
use log::debug;
use nalgebra::DVector;
use rayon::prelude::*;
use std::cell::RefCell;
use thread_local::ThreadLocal;

/// A single call of one of the integration routines of [`ContactIntegrator`].
#[derive(Debug, Clone, Copy)]
pub enum IntegrationJob<'a, T> {
    Slave {
        slave: &'a MortarElement<T>,
    },
    Segment2d {
        slave: &'a MortarElement<T>,
        master: &'a MortarElement<T>,
        bounds: SegmentBounds<T>,
    },
    Cell3d {
        slave: &'a MortarElement<T>,
        master: &'a MortarElement<T>,
        cell: &'a Intcell<T>,
    },
    AuxPlane {
        slave: &'a MortarElement<T>,
        master: &'a MortarElement<T>,
        cell: &'a Intcell<T>,
    },
    AuxPlaneQuad {
        slave: &'a MortarElement<T>,
        master: &'a MortarElement<T>,
        slave_sub: &'a IntElement<T>,
        master_sub: &'a IntElement<T>,
        cell: &'a Intcell<T>,
    },
}

impl<'a, T: Real> IntegrationJob<'a, T> {
    fn slave(&self) -> &'a MortarElement<T> {
        match *self {
            Self::Slave { slave }
            | Self::Segment2d { slave, .. }
            | Self::Cell3d { slave, .. }
            | Self::AuxPlane { slave, .. }
            | Self::AuxPlaneQuad { slave, .. } => slave,
        }
    }

    fn describe(&self) -> String {
        let slave = self.slave().id();
        match self {
            Self::Slave { .. } => format!("slave-only integration of element {slave}"),
            Self::Segment2d { master, .. } => {
                format!("segment integration of slave {slave} and master {}", master.id())
            }
            Self::Cell3d { master, .. } => format!("cell integration of slave {slave} and master {}", master.id()),
            Self::AuxPlane { master, .. } => {
                format!("auxiliary plane integration of slave {slave} and master {}", master.id())
            }
            Self::AuxPlaneQuad { master, .. } => format!(
                "quadratic auxiliary plane integration of slave {slave} and master {}",
                master.id()
            ),
        }
    }

    /// Zero-initialized dense targets of the right size.
    fn allocate(&self, settings: &IntegratorSettings<T>) -> MortarMatrices<T> {
        match *self {
            Self::Slave { slave } => MortarMatrices::for_slave(slave),
            Self::Segment2d { slave, master, .. } | Self::Cell3d { slave, master, .. } | Self::AuxPlane { slave, master, .. } => {
                MortarMatrices::for_pair(slave, master)
            }
            Self::AuxPlaneQuad {
                slave,
                master,
                slave_sub,
                ..
            } => {
                let mut matrices = MortarMatrices::for_pair(slave, master);
                if settings.petrov_galerkin {
                    matrices.gap = Some(DVector::zeros(slave_sub.element().num_nodes()));
                }
                matrices
            }
        }
    }
}

/// Runs the integrator over a batch of jobs.
///
/// A pass follows the lifecycle of the linearizations: the accumulator is reset, all jobs
/// are integrated, and the accumulator is complete once the pass returns. The dense
/// matrices of each job are returned in job order.
#[derive(Debug, Clone)]
pub struct MortarPass<T> {
    integrator: ContactIntegrator<T>,
}

impl<T: Real> MortarPass<T> {
    pub fn new(settings: IntegratorSettings<T>) -> eyre::Result<Self> {
        let integrator = ContactIntegrator::new(settings).wrap_err("failed to set up mortar integrator")?;
        Ok(Self { integrator })
    }

    pub fn integrator(&self) -> &ContactIntegrator<T> {
        &self.integrator
    }

    /// Runs a single job, accumulating its linearizations into `acc`.
    pub fn run_job(
        &self,
        job: &IntegrationJob<'_, T>,
        acc: &mut LinearizationAccumulator<T>,
    ) -> eyre::Result<MortarMatrices<T>> {
        let mut out = job.allocate(self.integrator.settings());
        let integrator = &self.integrator;
        let result = match *job {
            IntegrationJob::Slave { slave } => integrator.integrate_deriv_slave(slave, &mut out, acc),
            IntegrationJob::Segment2d { slave, master, bounds } => {
                integrator.integrate_deriv_segment_2d(slave, master, &bounds, &mut out, acc)
            }
            IntegrationJob::Cell3d { slave, master, cell } => {
                integrator.integrate_deriv_cell_3d(slave, master, cell, &mut out, acc)
            }
            IntegrationJob::AuxPlane { slave, master, cell } => {
                integrator.integrate_deriv_cell_3d_aux_plane(slave, master, cell, &mut out, acc)
            }
            IntegrationJob::AuxPlaneQuad {
                slave,
                master,
                slave_sub,
                master_sub,
                cell,
            } => integrator.integrate_deriv_cell_3d_aux_plane_quad(slave, master, slave_sub, master_sub, cell, &mut out, acc),
        };
        result.wrap_err_with(|| format!("{} failed", job.describe()))?;
        Ok(out)
    }

    /// Runs all jobs sequentially.
    pub fn run(
        &self,
        jobs: &[IntegrationJob<'_, T>],
        acc: &mut LinearizationAccumulator<T>,
    ) -> eyre::Result<Vec<MortarMatrices<T>>> {
        acc.reset();
        debug!("Running mortar pass over {} jobs", jobs.len());
        jobs.iter().map(|job| self.run_job(job, acc)).collect()
    }

    /// Runs all jobs in parallel.
    ///
    /// Each worker thread accumulates into its own accumulator. The thread-local results are
    /// merged into `acc` once all jobs have completed. Up to the order of floating-point
    /// summation the result equals that of [`run`](Self::run).
    pub fn run_par(
        &self,
        jobs: &[IntegrationJob<'_, T>],
        acc: &mut LinearizationAccumulator<T>,
    ) -> eyre::Result<Vec<MortarMatrices<T>>> {
        acc.reset();
        debug!("Running parallel mortar pass over {} jobs", jobs.len());
        let workspace: ThreadLocal<RefCell<LinearizationAccumulator<T>>> = ThreadLocal::new();
        let outputs = jobs
            .par_iter()
            .map(|job| {
                let local = &mut *workspace.get_or_default().borrow_mut();
                self.run_job(job, local)
            })
            .collect::<eyre::Result<Vec<_>>>()?;

        for local in workspace.into_iter() {
            acc.merge(&local.into_inner());
        }
        Ok(outputs)
    }
}
