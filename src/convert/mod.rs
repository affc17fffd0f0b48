//! Converters between native values and managed objects.
//!
//! Each converter resolves the classes, methods and fields it needs once, in
//! its `new` constructor, and then converts any number of values during the
//! same entry-point call. Converters never outlive the call that created
//! them.

mod enums;
mod locator;
mod model;
mod options;
mod scalar;

pub use enums::{CausalityConverter, DataTypeConverter, FmiVersionConverter, VariabilityConverter};
pub use locator::SlaveLocatorConverter;
pub use model::{
    SlaveIdConverter, SlaveTypeDescriptionConverter, VariableConverter,
    VariableDescriptionConverter, VariableSettingConverter,
};
pub use options::execution_options_to_native;
pub use scalar::ScalarValueConverter;

use crate::error::{Error, Result};
use crate::ffi::{enforce_not_null, ClassRef, Env, ObjectRef};

/// Names of the managed contract classes.
pub mod class_names {
    pub const DATA_TYPE: &str = "no/viproma/coral/model/DataType";
    pub const CAUSALITY: &str = "no/viproma/coral/model/Causality";
    pub const VARIABILITY: &str = "no/viproma/coral/model/Variability";
    pub const SLAVE_ID: &str = "no/viproma/coral/model/SlaveID";
    pub const SCALAR_VALUE: &str = "no/viproma/coral/model/ScalarValue";
    pub const VARIABLE: &str = "no/viproma/coral/model/Variable";
    pub const VARIABLE_SETTING: &str = "no/viproma/coral/model/VariableSetting";
    pub const VARIABLE_DESCRIPTION: &str = "no/viproma/coral/model/VariableDescription";
    pub const SLAVE_TYPE_DESCRIPTION: &str = "no/viproma/coral/model/SlaveTypeDescription";
    pub const SLAVE_LOCATOR: &str = "no/viproma/coral/net/SlaveLocator";
    pub const FMI_VERSION: &str = "no/viproma/coral/fmi/FMIVersion";
    pub const FMU: &str = "no/viproma/coral/fmi/FMU";
    pub const OPAQUE_INSTANCE: &str = "no/viproma/coral/slave/OpaqueInstance";
    pub const ADDED_SLAVE: &str = "no/viproma/coral/master/AddedSlave";
    pub const SLAVE_CONFIG: &str = "no/viproma/coral/master/SlaveConfig";
    pub const EXECUTION_OPTIONS: &str = "no/viproma/coral/master/ExecutionOptions";
    pub const SLAVE_TYPE: &str = "no/viproma/coral/master/ProviderCluster$SlaveType";
}

/// Reject null and objects that are not instances of `class`.
pub(crate) fn checked_instance(
    env: &mut dyn Env,
    obj: Option<ObjectRef>,
    class: ClassRef,
    class_name: &str,
) -> Result<ObjectRef> {
    let obj = enforce_not_null(obj)?;
    if env.is_instance_of(obj, class) {
        Ok(obj)
    } else {
        Err(Error::illegal_argument(format!(
            "expected an instance of {}",
            class_name.replace('/', ".")
        )))
    }
}
