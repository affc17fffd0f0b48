//! `no.viproma.coral.fmi.Importer` and `no.viproma.coral.fmi.FMU`

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::bridge::{lock, wrap_in_managed, Bridge};
use crate::convert::{class_names, FmiVersionConverter, SlaveTypeDescriptionConverter};
use crate::engine::{Engine, Fmu};
use crate::error::Result;
use crate::ffi::marshal::to_native_string;
use crate::ffi::{boundary, destructor, Env, FmuHandle, Handle, ImporterHandle, ObjectRef};

fn to_native_path(env: &mut dyn Env, path: Option<ObjectRef>) -> Result<PathBuf> {
    to_native_string(env, path).map(PathBuf::from)
}

/// `Importer`
impl<G: Engine> Bridge<G> {
    /// `Importer.createNative()`: cache in the engine's default location.
    pub fn importer_create(&self, env: &mut dyn Env) -> i64 {
        boundary(env, 0, |_| {
            let importer = self.engine().create_importer(None)?;
            Ok(self.importers.wrap(Arc::new(Mutex::new(importer)))?.into_raw())
        })
    }

    /// `Importer.createNativeP(String)`
    pub fn importer_create_with_cache(
        &self,
        env: &mut dyn Env,
        cache_path: Option<ObjectRef>,
    ) -> i64 {
        boundary(env, 0, |env| {
            let cache_path = to_native_path(env, cache_path)?;
            let importer = self.engine().create_importer(Some(&cache_path))?;
            Ok(self.importers.wrap(Arc::new(Mutex::new(importer)))?.into_raw())
        })
    }

    /// `Importer.destroyNative`
    pub fn importer_destroy(&self, env: &mut dyn Env, importer: i64) {
        let handle = ImporterHandle::from_raw(importer);
        if !handle.is_valid() {
            return;
        }
        destructor(env, || self.importers.destroy(handle).map(drop));
    }

    /// `Importer.importFMUNative(long, String)`
    pub fn importer_import_fmu(
        &self,
        env: &mut dyn Env,
        importer: i64,
        fmu_path: Option<ObjectRef>,
    ) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let importer = self.importers.get(ImporterHandle::from_raw(importer))?;
            let path = to_native_path(env, fmu_path)?;
            log::debug!("importing FMU {}", path.display());
            let fmu = lock(&importer).import(&path)?;
            wrap_in_managed(env, &self.fmus, class_names::FMU, fmu).map(Some)
        })
    }

    /// `Importer.importUnpackedFMUNative(long, String)`
    pub fn importer_import_unpacked_fmu(
        &self,
        env: &mut dyn Env,
        importer: i64,
        unpacked_fmu_path: Option<ObjectRef>,
    ) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let importer = self.importers.get(ImporterHandle::from_raw(importer))?;
            let path = to_native_path(env, unpacked_fmu_path)?;
            log::debug!("importing unpacked FMU {}", path.display());
            let fmu = lock(&importer).import_unpacked(&path)?;
            wrap_in_managed(env, &self.fmus, class_names::FMU, fmu).map(Some)
        })
    }

    /// `Importer.cleanCacheNative(long)`
    pub fn importer_clean_cache(&self, env: &mut dyn Env, importer: i64) {
        boundary(env, (), |_| {
            let importer = self.importers.get(ImporterHandle::from_raw(importer))?;
            let mut importer = lock(&importer);
            importer.clean_cache()
        })
    }
}

/// `FMU`
impl<G: Engine> Bridge<G> {
    fn fmu(&self, fmu: i64) -> Result<Arc<dyn Fmu>> {
        self.fmus.get(FmuHandle::from_raw(fmu))
    }

    /// `FMU.destroyNative`
    ///
    /// Slave instances created from the FMU stay valid.
    pub fn fmu_destroy(&self, env: &mut dyn Env, fmu: i64) {
        let handle = FmuHandle::from_raw(fmu);
        if !handle.is_valid() {
            return;
        }
        destructor(env, || self.fmus.destroy(handle).map(drop));
    }

    /// `FMU.getFMIVersionNative(long)`
    pub fn fmu_get_fmi_version(&self, env: &mut dyn Env, fmu: i64) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let version = self.fmu(fmu)?.fmi_version();
            FmiVersionConverter::new(env)?.to_managed(version).map(Some)
        })
    }

    /// `FMU.getDescriptionNative(long)`
    pub fn fmu_get_description(&self, env: &mut dyn Env, fmu: i64) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let fmu = self.fmu(fmu)?;
            SlaveTypeDescriptionConverter::new(env)?
                .to_managed(env, fmu.description())
                .map(Some)
        })
    }

    /// `FMU.instantiateSlaveNative(long)`
    ///
    /// Returns a new `OpaqueInstance`.
    pub fn fmu_instantiate_slave(&self, env: &mut dyn Env, fmu: i64) -> Option<ObjectRef> {
        boundary(env, None, |env| {
            let instance = self.fmu(fmu)?.instantiate_slave()?;
            wrap_in_managed(env, &self.instances, class_names::OPAQUE_INSTANCE, instance)
                .map(Some)
        })
    }
}
