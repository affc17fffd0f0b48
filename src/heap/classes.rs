//! Class definitions loaded into every [`Heap`].

use std::collections::HashMap;

use super::{Class, Heap, NativeMethod, Payload, OBJECT, STRING, THROWABLE};
use crate::convert::class_names;
use crate::error::{Error, Result};
use crate::ffi::marshal::{ITERABLE_CLASS as ITERABLE, ITERATOR_CLASS as ITERATOR};
use crate::ffi::{Env, ObjectRef, Value};

pub(super) const ARRAY_LIST: &str = "java/util/ArrayList";
const ARRAY_LIST_ITR: &str = "java/util/ArrayList$Itr";

const SLAVE_TYPE_DESCRIPTION_INIT: &str = "(Ljava/lang/String;Ljava/lang/String;\
     Ljava/lang/String;Ljava/lang/String;Ljava/lang/String;\
     [Lno/viproma/coral/model/VariableDescription;)V";

struct ClassBuilder {
    class: Class,
}

fn class(name: &str) -> ClassBuilder {
    ClassBuilder {
        class: Class {
            name: name.to_owned(),
            superclass: None,
            interfaces: Vec::new(),
            methods: HashMap::new(),
            fields: Vec::new(),
            statics: HashMap::new(),
        },
    }
}

impl ClassBuilder {
    fn extends(mut self, superclass: &str) -> Self {
        self.class.superclass = Some(superclass.to_owned());
        self
    }

    fn implements(mut self, interface: &str) -> Self {
        self.class.interfaces.push(interface.to_owned());
        self
    }

    fn method(mut self, name: &str, sig: &str, f: NativeMethod) -> Self {
        self.class
            .methods
            .insert((name.to_owned(), sig.to_owned()), Some(f));
        self
    }

    fn abstract_method(mut self, name: &str, sig: &str) -> Self {
        self.class
            .methods
            .insert((name.to_owned(), sig.to_owned()), None);
        self
    }

    fn field(mut self, name: &str, sig: &str) -> Self {
        self.class.fields.push((name.to_owned(), sig.to_owned()));
        self
    }

    fn install(self, heap: &mut Heap) {
        heap.define(self.class);
    }

    /// Install as an enum class with the given constants.
    fn install_enum(self, heap: &mut Heap, constants: &[&str]) {
        let class = heap.define(self.class);
        for name in constants {
            if let Ok(obj) = heap.new_object_unchecked(class, Payload::Constant((*name).to_owned())) {
                heap.classes[class.0 as usize]
                    .statics
                    .insert((*name).to_owned(), obj.into());
            }
        }
    }
}

fn arg(args: &[Value], index: usize) -> Result<Value> {
    args.get(index)
        .copied()
        .ok_or_else(|| Error::logic(format!("missing argument {}", index)))
}

macro_rules! getter {
    ($name:ident, $field:literal) => {
        fn $name(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
            heap.field_value(this, $field)
        }
    };
}

macro_rules! setter {
    ($name:ident, $field:literal) => {
        fn $name(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
            heap.set_field_value(this, $field, arg(args, 0)?)?;
            Ok(Value::Void)
        }
    };
}

fn no_op(_: &mut Heap, _: ObjectRef, _: &[Value]) -> Result<Value> {
    Ok(Value::Void)
}

fn enum_constant(heap: &mut Heap, class_name: &str, name: &str) -> Result<Value> {
    let class = heap.find_class(class_name)?;
    heap.get_static_field(class, name, "")
}

fn enum_name(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    let name = match heap.payload(this)? {
        Payload::Constant(name) => name.clone(),
        _ => return Err(Error::logic("object is not an enum constant")),
    };
    Ok(heap.alloc_str(&name)?.into())
}

/// A list over the elements of an array field, for `Iterable` getters.
fn list_of_array_field(heap: &mut Heap, this: ObjectRef, field: &str) -> Result<Value> {
    let elements = match heap.field_value(this, field)?.l()? {
        Some(array) => heap.array_elements(array)?,
        None => Vec::new(),
    };
    Ok(heap.new_list(elements)?.into())
}

// ---- java.lang / java.util ----

fn throwable_init(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    heap.set_field_value(this, super::MESSAGE_FIELD, arg(args, 0)?)?;
    Ok(Value::Void)
}

getter!(throwable_get_message, "detailMessage");

fn list_init(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    *heap.payload_mut(this)? = Payload::List(Vec::new());
    Ok(Value::Void)
}

fn list_items(heap: &Heap, list: ObjectRef) -> Result<&Vec<Option<ObjectRef>>> {
    match heap.payload(list)? {
        Payload::List(items) => Ok(items),
        _ => Err(Error::logic("object is not a list")),
    }
}

fn list_add(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    let element = arg(args, 0)?.l()?;
    match heap.payload_mut(this)? {
        Payload::List(items) => items.push(element),
        _ => return Err(Error::logic("object is not a list")),
    }
    Ok(Value::Boolean(true))
}

fn list_size(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    let len = list_items(heap, this)?.len();
    Ok(Value::Int(i32::try_from(len).unwrap_or(i32::MAX)))
}

fn list_get(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    let index = arg(args, 0)?.i()?;
    let items = list_items(heap, this)?;
    let len = items.len();
    let element = usize::try_from(index).ok().and_then(|i| items.get(i).copied());
    match element {
        Some(element) => Ok(Value::Object(element)),
        None => {
            let message = format!("Index {} out of bounds for length {}", index, len);
            Err(heap.raise("java/lang/IndexOutOfBoundsException", &message))
        }
    }
}

fn list_iterator(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    let class = heap.find_class(ARRAY_LIST_ITR)?;
    let it = heap.alloc(
        class,
        Payload::Iter {
            source: this,
            position: 0,
        },
    )?;
    Ok(it.into())
}

fn iter_state(heap: &Heap, it: ObjectRef) -> Result<(ObjectRef, usize)> {
    match heap.payload(it)? {
        Payload::Iter { source, position } => Ok((*source, *position)),
        _ => Err(Error::logic("object is not an iterator")),
    }
}

fn iter_has_next(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    let (source, position) = iter_state(heap, this)?;
    Ok(Value::Boolean(position < list_items(heap, source)?.len()))
}

fn iter_next(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    let (source, position) = iter_state(heap, this)?;
    let element = match list_items(heap, source)?.get(position).copied() {
        Some(element) => element,
        None => return Err(heap.raise("java/util/NoSuchElementException", "")),
    };
    if let Payload::Iter { position, .. } = heap.payload_mut(this)? {
        *position += 1;
    }
    Ok(Value::Object(element))
}

// ---- no.viproma.coral.model ----

getter!(slave_id_get_id, "id");
setter!(slave_id_init, "id");

fn scalar_init(heap: &mut Heap, this: ObjectRef, data_type: &str, field: &str, value: Value) -> Result<Value> {
    let dt = enum_constant(heap, class_names::DATA_TYPE, data_type)?;
    heap.set_field_value(this, "dataType_", dt)?;
    heap.set_field_value(this, field, value)?;
    Ok(Value::Void)
}

fn scalar_init_real(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    scalar_init(heap, this, "REAL", "realValue_", arg(args, 0)?)
}

fn scalar_init_integer(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    scalar_init(heap, this, "INTEGER", "integerValue_", arg(args, 0)?)
}

fn scalar_init_boolean(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    scalar_init(heap, this, "BOOLEAN", "booleanValue_", arg(args, 0)?)
}

fn scalar_init_string(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    scalar_init(heap, this, "STRING", "stringValue_", arg(args, 0)?)
}

getter!(scalar_get_data_type, "dataType_");

fn scalar_get(heap: &mut Heap, this: ObjectRef, data_type: &str, field: &str) -> Result<Value> {
    let expected = enum_constant(heap, class_names::DATA_TYPE, data_type)?;
    if heap.field_value(this, "dataType_")? != expected {
        return Err(heap.raise("java/lang/IllegalStateException", "Wrong data type"));
    }
    heap.field_value(this, field)
}

fn scalar_get_real(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    scalar_get(heap, this, "REAL", "realValue_")
}

fn scalar_get_integer(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    scalar_get(heap, this, "INTEGER", "integerValue_")
}

fn scalar_get_boolean(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    scalar_get(heap, this, "BOOLEAN", "booleanValue_")
}

fn scalar_get_string(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    scalar_get(heap, this, "STRING", "stringValue_")
}

fn variable_init(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    let slave = arg(args, 0)?;
    let id = arg(args, 1)?.i()?;
    if slave == Value::NULL {
        return Err(heap.raise("java/lang/IllegalArgumentException", "slaveID is null"));
    }
    if id < 0 {
        return Err(heap.raise("java/lang/IllegalArgumentException", "variableID is negative"));
    }
    heap.set_field_value(this, "slaveID_", slave)?;
    heap.set_field_value(this, "variableID_", Value::Int(id))?;
    Ok(Value::Void)
}

getter!(variable_get_slave_id, "slaveID_");
getter!(variable_get_variable_id, "variableID_");

fn setting_init_value(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    heap.set_field_value(this, "variableID_", arg(args, 0)?)?;
    heap.set_field_value(this, "value_", arg(args, 1)?)?;
    heap.set_field_value(this, "isConnectionChange_", Value::Boolean(false))?;
    Ok(Value::Void)
}

fn setting_init_connection(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    heap.set_field_value(this, "variableID_", arg(args, 0)?)?;
    heap.set_field_value(this, "connectedOutput_", arg(args, 1)?)?;
    heap.set_field_value(this, "isConnectionChange_", Value::Boolean(true))?;
    Ok(Value::Void)
}

getter!(setting_get_variable_id, "variableID_");
getter!(setting_get_value, "value_");
getter!(setting_get_connected_output, "connectedOutput_");
getter!(setting_is_connection_change, "isConnectionChange_");

fn setting_has_value(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    Ok(Value::Boolean(heap.field_value(this, "value_")? != Value::NULL))
}

getter!(vd_get_id, "id_");
setter!(vd_set_id, "id_");
getter!(vd_get_name, "name_");
setter!(vd_set_name, "name_");
getter!(vd_get_data_type, "dataType_");
setter!(vd_set_data_type, "dataType_");
getter!(vd_get_causality, "causality_");
setter!(vd_set_causality, "causality_");
getter!(vd_get_variability, "variability_");
setter!(vd_set_variability, "variability_");

const STD_FIELDS: [&str; 6] = ["name_", "uuid_", "description_", "author_", "version_", "variables_"];

fn std_init(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    for (index, field) in STD_FIELDS.iter().enumerate() {
        heap.set_field_value(this, field, arg(args, index)?)?;
    }
    Ok(Value::Void)
}

getter!(std_get_name, "name_");
getter!(std_get_uuid, "uuid_");
getter!(std_get_description, "description_");
getter!(std_get_author, "author_");
getter!(std_get_version, "version_");

fn std_get_variables(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    list_of_array_field(heap, this, "variables_")
}

// ---- no.viproma.coral.net ----

fn locator_init(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    heap.set_field_value(this, "controlEndpoint_", arg(args, 0)?)?;
    heap.set_field_value(this, "dataPubEndpoint_", arg(args, 1)?)?;
    Ok(Value::Void)
}

getter!(locator_get_control_endpoint, "controlEndpoint_");
getter!(locator_get_data_pub_endpoint, "dataPubEndpoint_");

// ---- no.viproma.coral.master ----

fn added_slave_init(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    let locator = arg(args, 0)?;
    if locator == Value::NULL {
        return Err(heap.raise("java/lang/IllegalArgumentException", "Slave locator is null"));
    }
    heap.set_field_value(this, "locator_", locator)?;
    heap.set_field_value(this, "name_", arg(args, 1)?)?;
    Ok(Value::Void)
}

getter!(added_slave_get_locator, "locator_");
getter!(added_slave_get_name, "name_");
getter!(added_slave_get_id, "id_");
setter!(added_slave_set_id, "id_");
getter!(added_slave_get_error, "error_");
setter!(added_slave_set_error, "error_");

fn slave_config_init(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    let (slave_id, settings) = (arg(args, 0)?, arg(args, 1)?);
    if slave_id == Value::NULL || settings == Value::NULL {
        return Err(heap.raise("java/lang/IllegalArgumentException", "Method argument is null"));
    }
    heap.set_field_value(this, "slaveID_", slave_id)?;
    heap.set_field_value(this, "variableSettings_", settings)?;
    Ok(Value::Void)
}

getter!(slave_config_get_slave_id, "slaveID_");
getter!(slave_config_get_variable_settings, "variableSettings_");
getter!(slave_config_get_error, "error_");
setter!(slave_config_set_error, "error_");

fn options_init(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    heap.set_field_value(this, "startTime_", Value::Double(0.0))?;
    heap.set_field_value(this, "maxTime_", Value::Double(f64::INFINITY))?;
    heap.set_field_value(this, "slaveVariableRecvTimeout_ms_", Value::Int(1000))?;
    Ok(Value::Void)
}

getter!(options_get_start_time, "startTime_");
getter!(options_get_max_time, "maxTime_");
getter!(options_get_recv_timeout, "slaveVariableRecvTimeout_ms_");

fn slave_type_init(heap: &mut Heap, this: ObjectRef, args: &[Value]) -> Result<Value> {
    heap.set_field_value(this, "description_", arg(args, 0)?)?;
    heap.set_field_value(this, "providers_", arg(args, 1)?)?;
    Ok(Value::Void)
}

getter!(slave_type_get_description, "description_");

fn slave_type_get_providers(heap: &mut Heap, this: ObjectRef, _: &[Value]) -> Result<Value> {
    list_of_array_field(heap, this, "providers_")
}

// ---- handle-holding classes ----

setter!(native_ptr_init, "nativePtr_");
getter!(native_ptr_get, "nativePtr_");

pub(super) fn load(heap: &mut Heap) {
    class(OBJECT).method("<init>", "()V", no_op).install(heap);
    class(STRING).extends(OBJECT).install(heap);
    class(ITERABLE)
        .abstract_method("iterator", "()Ljava/util/Iterator;")
        .install(heap);
    class(ITERATOR)
        .abstract_method("hasNext", "()Z")
        .abstract_method("next", "()Ljava/lang/Object;")
        .install(heap);
    class(ARRAY_LIST)
        .extends(OBJECT)
        .implements(ITERABLE)
        .method("<init>", "()V", list_init)
        .method("add", "(Ljava/lang/Object;)Z", list_add)
        .method("size", "()I", list_size)
        .method("get", "(I)Ljava/lang/Object;", list_get)
        .method("iterator", "()Ljava/util/Iterator;", list_iterator)
        .install(heap);
    class(ARRAY_LIST_ITR)
        .extends(OBJECT)
        .implements(ITERATOR)
        .method("hasNext", "()Z", iter_has_next)
        .method("next", "()Ljava/lang/Object;", iter_next)
        .install(heap);

    class(THROWABLE)
        .extends(OBJECT)
        .field(super::MESSAGE_FIELD, "Ljava/lang/String;")
        .method("<init>", "(Ljava/lang/String;)V", throwable_init)
        .method("getMessage", "()Ljava/lang/String;", throwable_get_message)
        .install(heap);
    for (name, superclass) in [
        ("java/lang/Exception", THROWABLE),
        ("java/lang/Error", THROWABLE),
        ("java/lang/RuntimeException", "java/lang/Exception"),
        ("java/util/concurrent/TimeoutException", "java/lang/Exception"),
        ("java/lang/IllegalArgumentException", "java/lang/RuntimeException"),
        ("java/lang/IllegalStateException", "java/lang/RuntimeException"),
        ("java/lang/NullPointerException", "java/lang/RuntimeException"),
        ("java/lang/ClassCastException", "java/lang/RuntimeException"),
        ("java/lang/ArrayStoreException", "java/lang/RuntimeException"),
        ("java/lang/NegativeArraySizeException", "java/lang/RuntimeException"),
        ("java/lang/IndexOutOfBoundsException", "java/lang/RuntimeException"),
        ("java/lang/ArrayIndexOutOfBoundsException", "java/lang/IndexOutOfBoundsException"),
        ("java/util/NoSuchElementException", "java/lang/RuntimeException"),
        ("java/lang/LinkageError", "java/lang/Error"),
        ("java/lang/NoClassDefFoundError", "java/lang/LinkageError"),
        ("java/lang/IncompatibleClassChangeError", "java/lang/LinkageError"),
        ("java/lang/NoSuchMethodError", "java/lang/IncompatibleClassChangeError"),
        ("java/lang/NoSuchFieldError", "java/lang/IncompatibleClassChangeError"),
        ("java/lang/AbstractMethodError", "java/lang/IncompatibleClassChangeError"),
        ("java/lang/VirtualMachineError", "java/lang/Error"),
        ("java/lang/OutOfMemoryError", "java/lang/VirtualMachineError"),
    ] {
        class(name).extends(superclass).install(heap);
    }

    class(class_names::DATA_TYPE)
        .extends(OBJECT)
        .method("name", "()Ljava/lang/String;", enum_name)
        .install_enum(heap, &["REAL", "INTEGER", "BOOLEAN", "STRING"]);
    class(class_names::CAUSALITY)
        .extends(OBJECT)
        .method("name", "()Ljava/lang/String;", enum_name)
        .install_enum(
            heap,
            &["PARAMETER", "CALCULATED_PARAMETER", "INPUT", "OUTPUT", "LOCAL"],
        );
    class(class_names::VARIABILITY)
        .extends(OBJECT)
        .method("name", "()Ljava/lang/String;", enum_name)
        .install_enum(
            heap,
            &["CONSTANT", "FIXED", "TUNABLE", "DISCRETE", "CONTINUOUS"],
        );
    class(class_names::FMI_VERSION)
        .extends(OBJECT)
        .method("name", "()Ljava/lang/String;", enum_name)
        .install_enum(heap, &["V1_0", "V2_0"]);

    class(class_names::SLAVE_ID)
        .extends(OBJECT)
        .field("id", "I")
        .method("<init>", "(I)V", slave_id_init)
        .method("getID", "()I", slave_id_get_id)
        .install(heap);
    class(class_names::SCALAR_VALUE)
        .extends(OBJECT)
        .field("dataType_", "Lno/viproma/coral/model/DataType;")
        .field("realValue_", "D")
        .field("integerValue_", "I")
        .field("booleanValue_", "Z")
        .field("stringValue_", "Ljava/lang/String;")
        .method("<init>", "(D)V", scalar_init_real)
        .method("<init>", "(I)V", scalar_init_integer)
        .method("<init>", "(Z)V", scalar_init_boolean)
        .method("<init>", "(Ljava/lang/String;)V", scalar_init_string)
        .method("getDataType", "()Lno/viproma/coral/model/DataType;", scalar_get_data_type)
        .method("getRealValue", "()D", scalar_get_real)
        .method("getIntegerValue", "()I", scalar_get_integer)
        .method("getBooleanValue", "()Z", scalar_get_boolean)
        .method("getStringValue", "()Ljava/lang/String;", scalar_get_string)
        .install(heap);
    class(class_names::VARIABLE)
        .extends(OBJECT)
        .field("slaveID_", "Lno/viproma/coral/model/SlaveID;")
        .field("variableID_", "I")
        .method("<init>", "(Lno/viproma/coral/model/SlaveID;I)V", variable_init)
        .method("getSlaveID", "()Lno/viproma/coral/model/SlaveID;", variable_get_slave_id)
        .method("getVariableID", "()I", variable_get_variable_id)
        .install(heap);
    class(class_names::VARIABLE_SETTING)
        .extends(OBJECT)
        .field("variableID_", "I")
        .field("value_", "Lno/viproma/coral/model/ScalarValue;")
        .field("isConnectionChange_", "Z")
        .field("connectedOutput_", "Lno/viproma/coral/model/Variable;")
        .method("<init>", "(ILno/viproma/coral/model/ScalarValue;)V", setting_init_value)
        .method("<init>", "(ILno/viproma/coral/model/Variable;)V", setting_init_connection)
        .method("getVariableID", "()I", setting_get_variable_id)
        .method("hasValue", "()Z", setting_has_value)
        .method("getValue", "()Lno/viproma/coral/model/ScalarValue;", setting_get_value)
        .method("isConnectionChange", "()Z", setting_is_connection_change)
        .method(
            "getConnectedOutput",
            "()Lno/viproma/coral/model/Variable;",
            setting_get_connected_output,
        )
        .install(heap);
    class(class_names::VARIABLE_DESCRIPTION)
        .extends(OBJECT)
        .field("id_", "I")
        .field("name_", "Ljava/lang/String;")
        .field("dataType_", "Lno/viproma/coral/model/DataType;")
        .field("causality_", "Lno/viproma/coral/model/Causality;")
        .field("variability_", "Lno/viproma/coral/model/Variability;")
        .method("<init>", "()V", no_op)
        .method("getID", "()I", vd_get_id)
        .method("setID", "(I)V", vd_set_id)
        .method("getName", "()Ljava/lang/String;", vd_get_name)
        .method("setName", "(Ljava/lang/String;)V", vd_set_name)
        .method("getDataType", "()Lno/viproma/coral/model/DataType;", vd_get_data_type)
        .method("setDataType", "(Lno/viproma/coral/model/DataType;)V", vd_set_data_type)
        .method("getCausality", "()Lno/viproma/coral/model/Causality;", vd_get_causality)
        .method("setCausality", "(Lno/viproma/coral/model/Causality;)V", vd_set_causality)
        .method("getVariability", "()Lno/viproma/coral/model/Variability;", vd_get_variability)
        .method("setVariability", "(Lno/viproma/coral/model/Variability;)V", vd_set_variability)
        .install(heap);
    class(class_names::SLAVE_TYPE_DESCRIPTION)
        .extends(OBJECT)
        .field("name_", "Ljava/lang/String;")
        .field("uuid_", "Ljava/lang/String;")
        .field("description_", "Ljava/lang/String;")
        .field("author_", "Ljava/lang/String;")
        .field("version_", "Ljava/lang/String;")
        .field("variables_", "[Lno/viproma/coral/model/VariableDescription;")
        .method("<init>", SLAVE_TYPE_DESCRIPTION_INIT, std_init)
        .method("getName", "()Ljava/lang/String;", std_get_name)
        .method("getUUID", "()Ljava/lang/String;", std_get_uuid)
        .method("getDescription", "()Ljava/lang/String;", std_get_description)
        .method("getAuthor", "()Ljava/lang/String;", std_get_author)
        .method("getVersion", "()Ljava/lang/String;", std_get_version)
        .method("getVariables", "()Ljava/lang/Iterable;", std_get_variables)
        .install(heap);

    class(class_names::SLAVE_LOCATOR)
        .extends(OBJECT)
        .field("controlEndpoint_", "Ljava/lang/String;")
        .field("dataPubEndpoint_", "Ljava/lang/String;")
        .method("<init>", "(Ljava/lang/String;Ljava/lang/String;)V", locator_init)
        .method("getControlEndpoint", "()Ljava/lang/String;", locator_get_control_endpoint)
        .method("getDataPubEndpoint", "()Ljava/lang/String;", locator_get_data_pub_endpoint)
        .install(heap);

    class(class_names::ADDED_SLAVE)
        .extends(OBJECT)
        .field("locator_", "Lno/viproma/coral/net/SlaveLocator;")
        .field("name_", "Ljava/lang/String;")
        .field("id_", "Lno/viproma/coral/model/SlaveID;")
        .field("error_", "Ljava/lang/String;")
        .method(
            "<init>",
            "(Lno/viproma/coral/net/SlaveLocator;Ljava/lang/String;)V",
            added_slave_init,
        )
        .method("getLocator", "()Lno/viproma/coral/net/SlaveLocator;", added_slave_get_locator)
        .method("getName", "()Ljava/lang/String;", added_slave_get_name)
        .method("getID", "()Lno/viproma/coral/model/SlaveID;", added_slave_get_id)
        .method("setID", "(Lno/viproma/coral/model/SlaveID;)V", added_slave_set_id)
        .method("getError", "()Ljava/lang/String;", added_slave_get_error)
        .method("setError", "(Ljava/lang/String;)V", added_slave_set_error)
        .install(heap);
    class(class_names::SLAVE_CONFIG)
        .extends(OBJECT)
        .field("slaveID_", "Lno/viproma/coral/model/SlaveID;")
        .field("variableSettings_", "Ljava/lang/Iterable;")
        .field("error_", "Ljava/lang/String;")
        .method(
            "<init>",
            "(Lno/viproma/coral/model/SlaveID;Ljava/lang/Iterable;)V",
            slave_config_init,
        )
        .method("getSlaveID", "()Lno/viproma/coral/model/SlaveID;", slave_config_get_slave_id)
        .method(
            "getVariableSettings",
            "()Ljava/lang/Iterable;",
            slave_config_get_variable_settings,
        )
        .method("getError", "()Ljava/lang/String;", slave_config_get_error)
        .method("setError", "(Ljava/lang/String;)V", slave_config_set_error)
        .install(heap);
    class(class_names::EXECUTION_OPTIONS)
        .extends(OBJECT)
        .field("startTime_", "D")
        .field("maxTime_", "D")
        .field("slaveVariableRecvTimeout_ms_", "I")
        .method("<init>", "()V", options_init)
        .method("getStartTime", "()D", options_get_start_time)
        .method("getMaxTime", "()D", options_get_max_time)
        .method("getSlaveVariableRecvTimeout_ms", "()I", options_get_recv_timeout)
        .install(heap);
    class(class_names::SLAVE_TYPE)
        .extends(OBJECT)
        .field("description_", "Lno/viproma/coral/model/SlaveTypeDescription;")
        .field("providers_", "[Ljava/lang/String;")
        .method(
            "<init>",
            "(Lno/viproma/coral/model/SlaveTypeDescription;[Ljava/lang/String;)V",
            slave_type_init,
        )
        .method(
            "getSlaveTypeDescription",
            "()Lno/viproma/coral/model/SlaveTypeDescription;",
            slave_type_get_description,
        )
        .method("getProviders", "()Ljava/lang/Iterable;", slave_type_get_providers)
        .install(heap);

    for name in [class_names::FMU, class_names::OPAQUE_INSTANCE] {
        class(name)
            .extends(OBJECT)
            .field("nativePtr_", "J")
            .method("<init>", "(J)V", native_ptr_init)
            .method("getNativePtr", "()J", native_ptr_get)
            .install(heap);
    }
}
