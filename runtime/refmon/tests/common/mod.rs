//! Helpers shared by the integration tests

#![allow(dead_code)]

use std::sync::Once;

use refmon::*;

static LOGGING: Once = Once::new();

/// Route kernel logging to the test output, once per test binary
pub fn init_test_logging() {
    LOGGING.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .filter_level(log::LevelFilter::Debug)
            .try_init();
    });
}

/// A running kernel without the init-time self-test
pub fn kernel() -> Kernel {
    init_test_logging();
    Kernel::start(KernelConfig {
        run_self_test: false,
        ..KernelConfig::for_testing()
    })
    .expect("kernel start")
}

/// Create an object through the system device
pub fn create(kernel: &Kernel, object_type: ObjectType, args: CreateArgs) -> Result<ObjectHandle> {
    let data = kernel.send(
        ObjectHandle::SYSTEM_DEVICE,
        Message::new(MessageType::DevCreateObject, object_type as i32, MessageData::Create(args)),
    )?;
    data.as_handle().ok_or(KernelError::NotFound)
}

/// Create a context for `algorithm`
pub fn context(kernel: &Kernel, algorithm: i32) -> ObjectHandle {
    let args = CreateArgs {
        arg1: algorithm,
        ..CreateArgs::default()
    };
    create(kernel, ObjectType::Context, args).expect("create context")
}

/// Create a file keyset
pub fn file_keyset(kernel: &Kernel) -> ObjectHandle {
    let args = CreateArgs {
        arg1: 1,
        str1: Some(b"keys.p15".to_vec()),
        ..CreateArgs::default()
    };
    create(kernel, ObjectType::Keyset, args).expect("create keyset")
}

/// Load a key, moving a conventional context into the high state
pub fn load_key(kernel: &Kernel, context: ObjectHandle) {
    kernel
        .send(context, Message::set_attribute_s(AttributeId::CTXINFO_KEY, &[0x42; 16]))
        .expect("load key");
}

/// Create an internal object straight through the trusted path, ready
/// for use
pub fn internal_object(kernel: &Kernel, object_type: ObjectType, subtype: SubType) -> ObjectHandle {
    let handle = kernel
        .create_object(CreateObjectInfo::new(object_type, subtype, MemoryObject::shared()))
        .expect("create internal object");
    kernel
        .send_internal(handle, Message::set_attribute(AttributeId::IATTRIBUTE_STATUS, 0))
        .expect("complete creation");
    handle
}
