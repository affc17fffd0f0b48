//! The bridge as loaded by a Java virtual machine.
//!
//! [`JvmEnv`] implements [`Env`] over a [`JNIEnv`], and the `Java_*`
//! functions below are the native methods of the `no.viproma.coral`
//! classes. They all go through one process-wide [`Bridge`], which the
//! embedding library sets up with [`install`] (typically from its
//! `JNI_OnLoad`) before any managed object is created.
//!
//! Local references handed to or produced by an [`Env`] call are kept for
//! the rest of the native method call, which is when the virtual machine
//! releases them.

use std::num::NonZeroU32;
use std::sync::OnceLock;

use jni::objects::{
    JClass, JFieldID, JMethodID, JObject, JObjectArray, JString, JValue, JValueGen, JValueOwned,
};
use jni::signature::{Primitive, ReturnType};
use jni::sys::{jboolean, jdouble, jint, jlong, jobject, jvalue};
use jni::JNIEnv;

use crate::bridge::Bridge;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::ffi::error::rethrow_as_managed;
use crate::ffi::{ClassRef, Env, FieldId, MethodId, ObjectRef, Value};

/// An [`Env`] over the JNI interface pointer of one native method call.
pub struct JvmEnv<'local> {
    env: JNIEnv<'local>,
    objects: Vec<JObject<'local>>,
    classes: Vec<JClass<'local>>,
    methods: Vec<(JMethodID, ReturnType)>,
    fields: Vec<(JFieldID, ReturnType)>,
}

/// Turn a JNI failure into an [`Error`]: pending if the virtual machine
/// raised an exception for it, a logic error otherwise.
fn lift<T>(env: &JNIEnv<'_>, result: jni::errors::Result<T>) -> Result<T> {
    result.map_err(|err| {
        if env.exception_check().unwrap_or(false) {
            Error::Pending
        } else {
            Error::logic(format!("JNI call failed: {}", err))
        }
    })
}

/// The return type of a method or the type of a field, from its descriptor.
fn return_type(descriptor: &str) -> Result<ReturnType> {
    let ty = match descriptor.rfind(')') {
        Some(i) => &descriptor[i + 1..],
        None => descriptor,
    };
    Ok(match ty.as_bytes().first() {
        Some(b'V') => ReturnType::Primitive(Primitive::Void),
        Some(b'Z') => ReturnType::Primitive(Primitive::Boolean),
        Some(b'B') => ReturnType::Primitive(Primitive::Byte),
        Some(b'C') => ReturnType::Primitive(Primitive::Char),
        Some(b'S') => ReturnType::Primitive(Primitive::Short),
        Some(b'I') => ReturnType::Primitive(Primitive::Int),
        Some(b'J') => ReturnType::Primitive(Primitive::Long),
        Some(b'F') => ReturnType::Primitive(Primitive::Float),
        Some(b'D') => ReturnType::Primitive(Primitive::Double),
        Some(b'L') => ReturnType::Object,
        Some(b'[') => ReturnType::Array,
        _ => return Err(Error::logic(format!("malformed type descriptor {:?}", descriptor))),
    })
}

fn slot<'a, T>(items: &'a [T], index: usize, what: &str) -> Result<&'a T> {
    items
        .get(index)
        .ok_or_else(|| Error::logic(format!("{} does not belong to this JNI environment", what)))
}

fn object<'a, 'local>(objects: &'a [JObject<'local>], r: ObjectRef) -> Result<&'a JObject<'local>> {
    slot(objects, r.into_raw().get() as usize - 1, "object reference")
}

fn class<'a, 'local>(classes: &'a [JClass<'local>], c: ClassRef) -> Result<&'a JClass<'local>> {
    slot(classes, c.0 as usize, "class reference")
}

impl<'local> JvmEnv<'local> {
    pub fn new(env: JNIEnv<'local>) -> Self {
        Self {
            env,
            objects: Vec::new(),
            classes: Vec::new(),
            methods: Vec::new(),
            fields: Vec::new(),
        }
    }

    /// Make a local reference available to entry points. Null becomes
    /// `None`.
    pub fn adopt(&mut self, obj: JObject<'local>) -> Option<ObjectRef> {
        if obj.is_null() {
            return None;
        }
        self.objects.push(obj);
        let index = u32::try_from(self.objects.len()).ok()?;
        NonZeroU32::new(index).map(ObjectRef::from_raw)
    }

    /// The raw reference to return from a native method. Null for `None`.
    pub fn to_raw(&self, obj: Option<ObjectRef>) -> jobject {
        obj.and_then(|r| object(&self.objects, r).ok())
            .map_or(std::ptr::null_mut(), |o| o.as_raw())
    }

    fn adopt_class(&mut self, class: JClass<'local>) -> ClassRef {
        self.classes.push(class);
        ClassRef(self.classes.len() as u32 - 1)
    }

    fn method(&self, method: MethodId) -> Result<(JMethodID, ReturnType)> {
        slot(&self.methods, method.0 as usize, "method ID").cloned()
    }

    fn field(&self, field: FieldId) -> Result<(JFieldID, ReturnType)> {
        slot(&self.fields, field.0 as usize, "field ID").cloned()
    }

    fn to_jvalue(&self, value: Value) -> Result<jvalue> {
        Ok(match value {
            Value::Void => return Err(Error::logic("void is not an argument value")),
            Value::Boolean(z) => jvalue { z: jboolean::from(z) },
            Value::Int(i) => jvalue { i },
            Value::Long(j) => jvalue { j },
            Value::Double(d) => jvalue { d },
            Value::Object(None) => jvalue {
                l: std::ptr::null_mut(),
            },
            Value::Object(Some(r)) => jvalue {
                l: object(&self.objects, r)?.as_raw(),
            },
        })
    }

    fn to_jvalues(&self, args: &[Value]) -> Result<Vec<jvalue>> {
        args.iter().map(|&arg| self.to_jvalue(arg)).collect()
    }

    fn from_jvalue(&mut self, value: JValueOwned<'local>) -> Result<Value> {
        Ok(match value {
            JValueGen::Void => Value::Void,
            JValueGen::Bool(z) => Value::Boolean(z != 0),
            JValueGen::Int(i) => Value::Int(i),
            JValueGen::Long(j) => Value::Long(j),
            JValueGen::Double(d) => Value::Double(d),
            JValueGen::Object(o) => Value::Object(self.adopt(o)),
            JValueGen::Byte(_) | JValueGen::Char(_) | JValueGen::Short(_) | JValueGen::Float(_) => {
                return Err(Error::logic("managed value of a type the bridge does not use"))
            }
        })
    }
}

impl Env for JvmEnv<'_> {
    fn exception_check(&self) -> bool {
        self.env.exception_check().unwrap_or(false)
    }

    fn exception_describe(&mut self) {
        if let Err(err) = self.env.exception_describe() {
            log::error!("could not describe the pending exception: {}", err);
        }
    }

    fn throw_new(&mut self, class: ClassRef, message: &str) -> Result<()> {
        let class = self::class(&self.classes, class)?;
        let thrown = self.env.throw_new(class, message);
        lift(&self.env, thrown)
    }

    fn fatal_error(&mut self, message: &str) -> ! {
        self.env.fatal_error(message)
    }

    fn find_class(&mut self, name: &str) -> Result<ClassRef> {
        let found = self.env.find_class(name);
        let class = lift(&self.env, found)?;
        Ok(self.adopt_class(class))
    }

    fn get_object_class(&mut self, obj: ObjectRef) -> Result<ClassRef> {
        let obj = object(&self.objects, obj)?;
        let found = self.env.get_object_class(obj);
        let class = lift(&self.env, found)?;
        Ok(self.adopt_class(class))
    }

    fn is_instance_of(&mut self, obj: ObjectRef, class: ClassRef) -> bool {
        match (object(&self.objects, obj), self::class(&self.classes, class)) {
            (Ok(obj), Ok(class)) => self.env.is_instance_of(obj, class).unwrap_or(false),
            _ => false,
        }
    }

    fn is_same_object(&self, a: Option<ObjectRef>, b: Option<ObjectRef>) -> bool {
        let null = JObject::null();
        let resolve = |r: Option<ObjectRef>| match r {
            Some(r) => object(&self.objects, r).ok(),
            None => Some(&null),
        };
        match (resolve(a), resolve(b)) {
            (Some(a), Some(b)) => self.env.is_same_object(a, b).unwrap_or(false),
            _ => false,
        }
    }

    fn get_method_id(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<MethodId> {
        let ret = return_type(sig)?;
        let class = self::class(&self.classes, class)?;
        let found = self.env.get_method_id(class, name, sig);
        let id = lift(&self.env, found)?;
        self.methods.push((id, ret));
        Ok(MethodId(self.methods.len() as u32 - 1))
    }

    fn get_field_id(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<FieldId> {
        let ty = return_type(sig)?;
        let class = self::class(&self.classes, class)?;
        let found = self.env.get_field_id(class, name, sig);
        let id = lift(&self.env, found)?;
        self.fields.push((id, ty));
        Ok(FieldId(self.fields.len() as u32 - 1))
    }

    fn get_static_field(&mut self, class: ClassRef, name: &str, sig: &str) -> Result<Value> {
        let class = self::class(&self.classes, class)?;
        let read = self.env.get_static_field(class, name, sig);
        let value = lift(&self.env, read)?;
        self.from_jvalue(value)
    }

    fn new_object(&mut self, class: ClassRef, ctor: MethodId, args: &[Value]) -> Result<ObjectRef> {
        let (ctor, _) = self.method(ctor)?;
        let args = self.to_jvalues(args)?;
        let class = self::class(&self.classes, class)?;
        // SAFETY: `ctor` was resolved on `class` with a descriptor the
        // converters build their argument lists from.
        let created = unsafe { self.env.new_object_unchecked(class, ctor, &args) };
        let obj = lift(&self.env, created)?;
        self.adopt(obj)
            .ok_or_else(|| Error::logic("constructor returned null"))
    }

    fn call_method(&mut self, obj: ObjectRef, method: MethodId, args: &[Value]) -> Result<Value> {
        let (method, ret) = self.method(method)?;
        let args = self.to_jvalues(args)?;
        let obj = object(&self.objects, obj)?;
        // SAFETY: as for `new_object`; `ret` comes from the same descriptor.
        let called = unsafe { self.env.call_method_unchecked(obj, method, ret, &args) };
        let value = lift(&self.env, called)?;
        self.from_jvalue(value)
    }

    fn get_field(&mut self, obj: ObjectRef, field: FieldId) -> Result<Value> {
        let (field, ty) = self.field(field)?;
        let obj = object(&self.objects, obj)?;
        // SAFETY: `ty` comes from the descriptor `field` was resolved with.
        let read = unsafe { self.env.get_field_unchecked(obj, field, ty) };
        let value = lift(&self.env, read)?;
        self.from_jvalue(value)
    }

    fn set_field(&mut self, obj: ObjectRef, field: FieldId, value: Value) -> Result<()> {
        let (field, _) = self.field(field)?;
        let null = JObject::null();
        let value = match value {
            Value::Void => return Err(Error::logic("cannot store void in a field")),
            Value::Boolean(z) => JValue::Bool(jboolean::from(z)),
            Value::Int(i) => JValue::Int(i),
            Value::Long(j) => JValue::Long(j),
            Value::Double(d) => JValue::Double(d),
            Value::Object(None) => JValue::Object(&null),
            Value::Object(Some(r)) => JValue::Object(object(&self.objects, r)?),
        };
        let obj = object(&self.objects, obj)?;
        // SAFETY: the converters store values of the field's declared type.
        let written = unsafe { self.env.set_field_unchecked(obj, field, value) };
        lift(&self.env, written)
    }

    fn new_string(&mut self, s: &str) -> Result<ObjectRef> {
        let created = self.env.new_string(s);
        let s = lift(&self.env, created)?;
        self.adopt(JObject::from(s))
            .ok_or_else(|| Error::logic("NewStringUTF returned null"))
    }

    fn get_string(&mut self, s: ObjectRef) -> Result<String> {
        let s: &JString = object(&self.objects, s)?.into();
        let read = self.env.get_string(s).map(String::from);
        lift(&self.env, read)
    }

    fn new_object_array(&mut self, len: i32, element_class: ClassRef) -> Result<ObjectRef> {
        let class = self::class(&self.classes, element_class)?;
        let created = self.env.new_object_array(len, class, JObject::null());
        let array = lift(&self.env, created)?;
        self.adopt(JObject::from(array))
            .ok_or_else(|| Error::logic("NewObjectArray returned null"))
    }

    fn set_object_array_element(
        &mut self,
        array: ObjectRef,
        index: i32,
        value: Option<ObjectRef>,
    ) -> Result<()> {
        let array: &JObjectArray = object(&self.objects, array)?.into();
        let null = JObject::null();
        let value = match value {
            Some(r) => object(&self.objects, r)?,
            None => &null,
        };
        let stored = self.env.set_object_array_element(array, index, value);
        lift(&self.env, stored)
    }
}

static BRIDGE: OnceLock<Bridge<Box<dyn Engine>>> = OnceLock::new();

/// Make `engine` the engine behind every native method. Only the first call
/// succeeds.
pub fn install<G: Engine + 'static>(engine: G) -> Result<()> {
    let engine: Box<dyn Engine> = Box::new(engine);
    BRIDGE
        .set(Bridge::new(engine))
        .map_err(|_| Error::illegal_state("a Coral engine is already installed"))
}

fn with_bridge<'local, T>(
    env: JNIEnv<'local>,
    default: T,
    call: impl FnOnce(&Bridge<Box<dyn Engine>>, &mut JvmEnv<'local>) -> T,
) -> T {
    let mut env = JvmEnv::new(env);
    match BRIDGE.get() {
        Some(bridge) => call(bridge, &mut env),
        None => {
            rethrow_as_managed(&mut env, Error::illegal_state("no Coral engine is installed"));
            default
        }
    }
}

// no.viproma.coral.master.Execution

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_createNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    name: JString<'local>,
    options: JObject<'local>,
) -> jlong {
    with_bridge(env, 0, |bridge, env| {
        let name = env.adopt(name.into());
        let options = env.adopt(options);
        bridge.execution_create(env, name, options)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    execution: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.execution_destroy(env, execution))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_addSlavesNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    execution: jlong,
    slaves_to_add: JObject<'local>,
    comm_timeout_ms: jint,
) {
    with_bridge(env, (), |bridge, env| {
        let slaves_to_add = env.adopt(slaves_to_add);
        bridge.execution_add_slaves(env, execution, slaves_to_add, comm_timeout_ms)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_reconfigureNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    execution: jlong,
    slave_configs: JObject<'local>,
    comm_timeout_ms: jint,
) {
    with_bridge(env, (), |bridge, env| {
        let slave_configs = env.adopt(slave_configs);
        bridge.execution_reconfigure(env, execution, slave_configs, comm_timeout_ms)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_stepNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    execution: jlong,
    step_size: jdouble,
    timeout_ms: jint,
) -> jboolean {
    with_bridge(env, 0, |bridge, env| {
        jboolean::from(bridge.execution_step(env, execution, step_size, timeout_ms))
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_acceptStepNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    execution: jlong,
    timeout_ms: jint,
) {
    with_bridge(env, (), |bridge, env| {
        bridge.execution_accept_step(env, execution, timeout_ms)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_addSlaveNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    execution: jlong,
    locator: JObject<'local>,
    name: JString<'local>,
    comm_timeout_ms: jint,
) -> jlong {
    with_bridge(env, 0, |bridge, env| {
        let locator = env.adopt(locator);
        let name = env.adopt(name.into());
        bridge.execution_add_slave(env, execution, locator, name, comm_timeout_ms)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Execution_setVariablesNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    execution: jlong,
    slave_id: jint,
    variable_settings: JObject<'local>,
    comm_timeout_ms: jint,
) -> jlong {
    with_bridge(env, 0, |bridge, env| {
        let variable_settings = env.adopt(variable_settings);
        bridge.execution_set_variables(env, execution, slave_id, variable_settings, comm_timeout_ms)
    })
}

// no.viproma.coral.master.ProviderCluster

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_ProviderCluster_createNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    network_interface: JString<'local>,
    discovery_port: jint,
) -> jlong {
    with_bridge(env, 0, |bridge, env| {
        let network_interface = env.adopt(network_interface.into());
        bridge.cluster_create(env, network_interface, discovery_port)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_ProviderCluster_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    cluster: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.cluster_destroy(env, cluster))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_ProviderCluster_getSlaveTypesNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    cluster: jlong,
    timeout_ms: jint,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let slave_types = bridge.cluster_get_slave_types(env, cluster, timeout_ms);
        env.to_raw(slave_types)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_ProviderCluster_instantiateSlaveNative<
    'local,
>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    cluster: jlong,
    slave_provider_id: JString<'local>,
    slave_type_uuid: JString<'local>,
    timeout_ms: jint,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let provider = env.adopt(slave_provider_id.into());
        let uuid = env.adopt(slave_type_uuid.into());
        let locator = bridge.cluster_instantiate_slave(env, cluster, provider, uuid, timeout_ms);
        env.to_raw(locator)
    })
}

// no.viproma.coral.master.Future

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Future_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    future: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.future_destroy(env, future))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Future_waitForResultNative__J<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    future: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.future_wait(env, future))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Future_waitForResultNative__JI<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    future: jlong,
    timeout_ms: jint,
) -> jboolean {
    with_bridge(env, 0, |bridge, env| {
        jboolean::from(bridge.future_wait_for(env, future, timeout_ms))
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Future_00024Void_getValueNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    future: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.future_void_get(env, future))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_master_Future_00024SlaveID_getValueNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    future: jlong,
) -> jint {
    with_bridge(env, 0, |bridge, env| bridge.future_slave_id_get(env, future))
}

// no.viproma.coral.fmi.Importer

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_Importer_createNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
) -> jlong {
    with_bridge(env, 0, |bridge, env| bridge.importer_create(env))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_Importer_createNativeP<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    cache_path: JString<'local>,
) -> jlong {
    with_bridge(env, 0, |bridge, env| {
        let cache_path = env.adopt(cache_path.into());
        bridge.importer_create_with_cache(env, cache_path)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_Importer_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    importer: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.importer_destroy(env, importer))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_Importer_importFMUNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    importer: jlong,
    fmu_path: JString<'local>,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let fmu_path = env.adopt(fmu_path.into());
        let fmu = bridge.importer_import_fmu(env, importer, fmu_path);
        env.to_raw(fmu)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_Importer_importUnpackedFMUNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    importer: jlong,
    unpacked_fmu_path: JString<'local>,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let path = env.adopt(unpacked_fmu_path.into());
        let fmu = bridge.importer_import_unpacked_fmu(env, importer, path);
        env.to_raw(fmu)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_Importer_cleanCacheNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    importer: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.importer_clean_cache(env, importer))
}

// no.viproma.coral.fmi.FMU

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_FMU_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    fmu: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.fmu_destroy(env, fmu))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_FMU_getFMIVersionNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    fmu: jlong,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let version = bridge.fmu_get_fmi_version(env, fmu);
        env.to_raw(version)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_FMU_getDescriptionNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    fmu: jlong,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let description = bridge.fmu_get_description(env, fmu);
        env.to_raw(description)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_fmi_FMU_instantiateSlaveNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    fmu: jlong,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let instance = bridge.fmu_instantiate_slave(env, fmu);
        env.to_raw(instance)
    })
}

// no.viproma.coral.slave

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_OpaqueInstance_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    instance: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.instance_destroy(env, instance))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_OpaqueInstance_getTypeDescriptionNative<
    'local,
>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    instance: jlong,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let description = bridge.instance_get_type_description(env, instance);
        env.to_raw(description)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_InstanceFactory_newCSVLoggingInstanceNative<
    'local,
>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    instance_to_wrap: jlong,
    output_file_prefix: JString<'local>,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let prefix = env.adopt(output_file_prefix.into());
        let logging =
            bridge.instance_factory_new_csv_logging_instance(env, instance_to_wrap, prefix);
        env.to_raw(logging)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_InProcessRunner_createNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    instance: jlong,
) -> jlong {
    with_bridge(env, 0, |bridge, env| bridge.in_process_runner_create(env, instance))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_InProcessRunner_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    runner: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.runner_destroy(env, runner))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_InProcessRunner_getLocatorNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    runner: jlong,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let locator = bridge.runner_get_locator(env, runner);
        env.to_raw(locator)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_InProcessRunner_runNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    runner: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.runner_run(env, runner))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_NetworkedRunner_createNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    instance: jlong,
    bind_address: JString<'local>,
    control_port: jint,
    data_pub_port: jint,
    comm_timeout_s: jint,
) -> jlong {
    with_bridge(env, 0, |bridge, env| {
        let bind_address = env.adopt(bind_address.into());
        bridge.networked_runner_create(
            env,
            instance,
            bind_address,
            control_port,
            data_pub_port,
            comm_timeout_s,
        )
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_NetworkedRunner_destroyNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    runner: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.runner_destroy(env, runner))
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_NetworkedRunner_getLocatorNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    runner: jlong,
) -> jobject {
    with_bridge(env, std::ptr::null_mut(), |bridge, env| {
        let locator = bridge.runner_get_locator(env, runner);
        env.to_raw(locator)
    })
}

#[no_mangle]
pub extern "system" fn Java_no_viproma_coral_slave_NetworkedRunner_runNative<'local>(
    env: JNIEnv<'local>,
    _class: JClass<'local>,
    runner: jlong,
) {
    with_bridge(env, (), |bridge, env| bridge.runner_run(env, runner))
}
