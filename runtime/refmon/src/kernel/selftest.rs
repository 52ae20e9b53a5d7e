//! Kernel self-test
//!
//! Exercises the reference monitor the same way any caller would, through
//! messages only. Each step sends one message and compares the status it
//! gets back with the status the ACLs should produce; a mismatch means the
//! tables or the dispatcher are broken and the kernel refuses to come up.

use super::Kernel;
use crate::algo::{ALGO_DES, ALGO_HMAC_MD5, ALGO_HMAC_SHA1};
use crate::attr_id::AttributeId;
use crate::dispatch::{CreateArgs, Message, MessageData, MessageType};
use crate::error::internal_error;
use crate::limits::{MAX_TEXTSIZE, MIN_TIME_VALUE};
use crate::object_type::ObjectType;
use crate::objects::{Action, ActionLevel, ActionPerms, ObjectHandle};
use crate::{KernelError, Result};

const ONE_DAY: i64 = 86_400;

/// Creation argument selecting a plain certificate
const CERT_ARG: i32 = 1;
/// Creation argument selecting a CRL
const CRL_ARG: i32 = 7;

struct SelfTest<'a> {
    kernel: &'a Kernel,
    created: Vec<ObjectHandle>,
}

impl SelfTest<'_> {
    fn create(&mut self, object_type: ObjectType, arg1: i32) -> Result<ObjectHandle> {
        let args = CreateArgs {
            arg1,
            ..CreateArgs::default()
        };
        let created = self.kernel.send(
            ObjectHandle::SYSTEM_DEVICE,
            Message::new(MessageType::DevCreateObject, object_type as i32, MessageData::Create(args)),
        );
        let Ok(MessageData::Handle(handle)) = created else {
            log::error!("self-test couldn't create a {object_type:?}: {created:?}");
            internal_error!("kernel self-test failed");
        };
        self.created.push(handle);
        Ok(handle)
    }

    /// Send `message` externally and check the status that comes back
    fn external(&self, step: &str, handle: ObjectHandle, message: Message, expected: Result<()>) -> Result<()> {
        check(step, self.kernel.send(handle, message).map(drop), expected)
    }

    fn internal(&self, step: &str, handle: ObjectHandle, message: Message, expected: Result<()>) -> Result<()> {
        check(step, self.kernel.send_internal(handle, message).map(drop), expected)
    }

    fn encrypt() -> Message {
        Message::new(MessageType::CtxEncrypt, 0, MessageData::Bytes(vec![0; 8]))
    }

    fn run(&mut self) -> Result<()> {
        let des = self.create(ObjectType::Context, ALGO_DES)?;
        self.isolation(des)?;
        self.value_ranges(des)?;
        self.access_kinds(des)?;
        self.key_state(des)?;
        self.internal_actions(des)?;
        self.usage_count(des)?;
        self.locking(des)?;
        self.certificates()
    }

    fn isolation(&self, des: ObjectHandle) -> Result<()> {
        self.external(
            "internal attribute hidden",
            des,
            Message::get_attribute(AttributeId::IATTRIBUTE_TYPE),
            Err(KernelError::ArgValue),
        )?;
        self.internal(
            "make internal",
            des,
            Message::set_attribute(AttributeId::IATTRIBUTE_INTERNAL, 1),
            Ok(()),
        )?;
        self.external(
            "internal object hidden",
            des,
            Message::get_attribute(AttributeId::CTXINFO_MODE),
            Err(KernelError::ArgObject),
        )?;
        self.internal(
            "make external",
            des,
            Message::set_attribute(AttributeId::IATTRIBUTE_INTERNAL, 0),
            Ok(()),
        )
    }

    fn value_ranges(&self, des: ObjectHandle) -> Result<()> {
        let mode = |value| Message::set_attribute(AttributeId::CTXINFO_MODE, value);
        self.external("mode below range", des, mode(0), Err(KernelError::ArgNum1))?;
        self.external("mode above range", des, mode(6), Err(KernelError::ArgNum1))?;
        self.external("mode lower bound", des, mode(1), Ok(()))?;
        self.external("mode upper bound", des, mode(5), Ok(()))?;
        self.external("mode", des, mode(2), Ok(()))?;

        let label = |value: &[u8]| Message::set_attribute_s(AttributeId::CTXINFO_LABEL, value);
        let too_long = vec![b'x'; MAX_TEXTSIZE as usize + 1];
        self.external("empty label", des, label(b""), Err(KernelError::ArgStr1))?;
        self.external("long label", des, label(too_long.as_slice()), Err(KernelError::ArgStr1))?;
        self.external("label", des, label(b"selftest"), Ok(()))?;
        self.external(
            "delete label",
            des,
            Message::delete_attribute(AttributeId::CTXINFO_LABEL),
            Ok(()),
        )?;

        let persistent = |value| Message::set_attribute(AttributeId::CTXINFO_PERSISTENT, value);
        self.external("bad boolean", des, persistent(2), Err(KernelError::ArgNum1))?;
        self.external("boolean", des, persistent(1), Ok(()))?;

        let keying = |value| Message::set_attribute(AttributeId::CTXINFO_KEYING_ALGO, value);
        self.external("allowed value", des, keying(ALGO_HMAC_SHA1), Ok(()))?;
        self.external("disallowed value", des, keying(ALGO_HMAC_MD5), Err(KernelError::ArgNum1))
    }

    fn access_kinds(&self, des: ObjectHandle) -> Result<()> {
        self.external(
            "read-only attribute",
            des,
            Message::set_attribute(AttributeId::CTXINFO_ALGO, ALGO_DES),
            Err(KernelError::Permission),
        )?;
        self.external(
            "write-only attribute",
            des,
            Message::get_attribute_s(AttributeId::CTXINFO_KEY),
            Err(KernelError::Permission),
        )?;
        self.external(
            "non-deletable attribute",
            des,
            Message::delete_attribute(AttributeId::CTXINFO_MODE),
            Err(KernelError::Permission),
        )
    }

    fn key_state(&self, des: ObjectHandle) -> Result<()> {
        self.external(
            "load key",
            des,
            Message::set_attribute_s(AttributeId::CTXINFO_KEY, &[0x5A; 16]),
            Ok(()),
        )?;
        self.external(
            "low-state attribute once keyed",
            des,
            Message::set_attribute(AttributeId::CTXINFO_MODE, 3),
            Err(KernelError::Permission),
        )
    }

    fn internal_actions(&self, des: ObjectHandle) -> Result<()> {
        let perms = ActionPerms::ALL.with(Action::Encrypt, ActionLevel::NoneExternal);
        self.internal(
            "restrict actions",
            des,
            Message::set_attribute(AttributeId::IATTRIBUTE_ACTIONPERMS, i32::from(perms.bits())),
            Ok(()),
        )?;
        self.external("external encrypt", des, Self::encrypt(), Err(KernelError::Permission))?;
        self.internal("internal encrypt", des, Self::encrypt(), Ok(()))
    }

    fn usage_count(&self, des: ObjectHandle) -> Result<()> {
        self.external(
            "set usage count",
            des,
            Message::set_attribute(AttributeId::PROPERTY_USAGECOUNT, 1),
            Ok(()),
        )?;
        self.internal("last permitted use", des, Self::encrypt(), Ok(()))?;
        self.internal("use past count", des, Self::encrypt(), Err(KernelError::Permission))
    }

    fn locking(&self, des: ObjectHandle) -> Result<()> {
        let forward = |count| Message::set_attribute(AttributeId::PROPERTY_FORWARDCOUNT, count);
        self.external("forward count", des, forward(5), Ok(()))?;
        self.external(
            "lock properties",
            des,
            Message::set_attribute(AttributeId::PROPERTY_LOCKED, 1),
            Ok(()),
        )?;
        self.external("forward count when locked", des, forward(4), Err(KernelError::Permission))
    }

    fn certificates(&mut self) -> Result<()> {
        let cert = self.create(ObjectType::Certificate, CERT_ARG)?;
        let valid_from = |time| Message::set_attribute_time(AttributeId::CERTINFO_VALIDFROM, time);
        self.external("time too early", cert, valid_from(MIN_TIME_VALUE), Err(KernelError::ArgStr1))?;
        self.external("time", cert, valid_from(MIN_TIME_VALUE + ONE_DAY), Ok(()))?;

        let crl = self.create(ObjectType::Certificate, CRL_ARG)?;
        let reason = |value| Message::set_attribute(AttributeId::CERTINFO_CRLREASON, value);
        self.external("between subranges", crl, reason(7), Err(KernelError::ArgNum1))?;
        self.external("in subrange", crl, reason(8), Ok(()))
    }
}

fn check(step: &str, actual: Result<()>, expected: Result<()>) -> Result<()> {
    if actual != expected {
        log::error!("self-test step '{step}': expected {expected:?}, got {actual:?}");
        internal_error!("kernel self-test failed");
    }
    log::trace!("self-test step '{step}' passed");
    Ok(())
}

pub(super) fn run(kernel: &Kernel) -> Result<()> {
    let mut test = SelfTest {
        kernel,
        created: Vec::new(),
    };
    let result = test.run();
    for handle in test.created {
        if let Err(err) = kernel.send_internal(handle, Message::bare(MessageType::Destroy)) {
            log::warn!("couldn't destroy self-test object {handle:?}: {err}");
        }
    }
    result
}
