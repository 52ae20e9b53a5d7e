//! Certificate export ACL
//!
//! Not every certificate object can be written in every format: a chain
//! format needs something chain-shaped, and anything that isn't a request
//! has to be signed before it can leave the object.

use crate::error::internal_error;
use crate::object_type::{SubTypeA, SubTypeSet};
use crate::objects::{ObjectFlags, ObjectHandle, ObjectTable};
use crate::{KernelError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExportFormat {
    Certificate = 1,
    CertChain = 2,
    TextCertificate = 3,
    TextCertChain = 4,
    XmlCertificate = 5,
    XmlCertChain = 6,
    // Internal-only below here
    CertData = 7,
    CertSet = 8,
    CmsAttributes = 9,
}

impl ExportFormat {
    pub const ALL: [ExportFormat; 9] = [
        ExportFormat::Certificate,
        ExportFormat::CertChain,
        ExportFormat::TextCertificate,
        ExportFormat::TextCertChain,
        ExportFormat::XmlCertificate,
        ExportFormat::XmlCertChain,
        ExportFormat::CertData,
        ExportFormat::CertSet,
        ExportFormat::CmsAttributes,
    ];

    pub fn from_raw(value: i32) -> Option<Self> {
        Self::ALL.iter().copied().find(|format| *format as i32 == value)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct ExportAcl {
    pub format: ExportFormat,
    pub subtypes: SubTypeA,
    pub internal_only: bool,
    /// Object must be signed
    pub high: bool,
}

const ENCODABLE: SubTypeA = SubTypeA::CERT_ANY.difference(SubTypeA::CERT_CMSATTR);
const CHAINS: SubTypeA = SubTypeA::CERT_CERT.union(SubTypeA::CERT_CERTCHAIN);
const REQUESTS: SubTypeA = SubTypeA::CERT_CERTREQ
    .union(SubTypeA::CERT_REQ_CERT)
    .union(SubTypeA::CERT_REQ_REV)
    .union(SubTypeA::CERT_RTCS_REQ)
    .union(SubTypeA::CERT_OCSP_REQ);

/// One entry per format, in format order
pub static EXPORT_ACL: [ExportAcl; 9] = [
    ExportAcl { format: ExportFormat::Certificate, subtypes: ENCODABLE, internal_only: false, high: true },
    ExportAcl { format: ExportFormat::CertChain, subtypes: CHAINS, internal_only: false, high: true },
    ExportAcl { format: ExportFormat::TextCertificate, subtypes: ENCODABLE, internal_only: false, high: true },
    ExportAcl { format: ExportFormat::TextCertChain, subtypes: CHAINS, internal_only: false, high: true },
    ExportAcl { format: ExportFormat::XmlCertificate, subtypes: ENCODABLE, internal_only: false, high: true },
    ExportAcl { format: ExportFormat::XmlCertChain, subtypes: CHAINS, internal_only: false, high: true },
    ExportAcl { format: ExportFormat::CertData, subtypes: ENCODABLE, internal_only: true, high: false },
    ExportAcl { format: ExportFormat::CertSet, subtypes: SubTypeA::CERT_CERTCHAIN, internal_only: true, high: true },
    ExportAcl {
        format: ExportFormat::CmsAttributes,
        subtypes: SubTypeA::CERT_CMSATTR,
        internal_only: true,
        high: false,
    },
];

/// Check that `target` may be exported in `format`
pub fn check_export_access(objects: &ObjectTable, target: ObjectHandle, format: i32, internal: bool) -> Result<()> {
    let acl = ExportFormat::from_raw(format)
        .map(|format| &EXPORT_ACL[format as usize - 1])
        .ok_or(KernelError::ArgValue)?;
    if acl.internal_only && !internal {
        return Err(KernelError::ArgValue);
    }
    let record = objects.lookup(target)?;
    if !SubTypeSet::a(acl.subtypes).contains(record.subtype) {
        return Err(KernelError::ArgValue);
    }
    // Unsigned requests are exported to be signed elsewhere
    let request = SubTypeSet::a(REQUESTS).contains(record.subtype);
    if acl.high && !request && !record.is_high() {
        return Err(KernelError::NotInited);
    }
    if record.flags.contains(ObjectFlags::NONEXPORTABLE) {
        return Err(KernelError::Permission);
    }
    Ok(())
}

/// Init-time consistency check of the export ACL
pub fn check_tables() -> Result<()> {
    for (index, acl) in EXPORT_ACL.iter().enumerate() {
        if acl.format as usize != index + 1 {
            log::error!("export ACL entry {index} is out of order");
            internal_error!("export ACL out of order");
        }
        if acl.subtypes.is_empty() || !SubTypeA::CERT_ANY.contains(acl.subtypes) {
            log::error!("export ACL for {:?} names non-certificate subtypes", acl.format);
            internal_error!("inconsistent export ACL");
        }
    }
    log::debug!("export ACL verified");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatch::MemoryObject;
    use crate::object_type::{ObjectType, SubType};
    use crate::objects::ObjectRecord;

    fn add(table: &mut ObjectTable, subtype: SubTypeA, high: bool) -> ObjectHandle {
        let mut record = ObjectRecord::new(ObjectType::Certificate, SubType::A(subtype), MemoryObject::shared());
        record.flags = if high { ObjectFlags::HIGH } else { ObjectFlags::empty() };
        table.allocate(record).unwrap()
    }

    #[test]
    fn test_tables_consistent() {
        assert_eq!(check_tables(), Ok(()));
    }

    #[test]
    fn test_format_and_subtype() {
        let mut table = ObjectTable::new(256, 256, 13).unwrap();
        let cert = add(&mut table, SubTypeA::CERT_CERT, true);
        let crl = add(&mut table, SubTypeA::CERT_CRL, true);
        assert_eq!(check_export_access(&table, cert, ExportFormat::CertChain as i32, false), Ok(()));
        assert_eq!(
            check_export_access(&table, crl, ExportFormat::CertChain as i32, false),
            Err(KernelError::ArgValue)
        );
        assert_eq!(check_export_access(&table, crl, 0, false), Err(KernelError::ArgValue));
        assert_eq!(
            check_export_access(&table, cert, ExportFormat::CertData as i32, false),
            Err(KernelError::ArgValue)
        );
        assert_eq!(check_export_access(&table, cert, ExportFormat::CertData as i32, true), Ok(()));
    }

    #[test]
    fn test_unsigned_objects() {
        let mut table = ObjectTable::new(256, 256, 13).unwrap();
        let cert = add(&mut table, SubTypeA::CERT_CERT, false);
        let request = add(&mut table, SubTypeA::CERT_CERTREQ, false);
        let format = ExportFormat::Certificate as i32;
        assert_eq!(check_export_access(&table, cert, format, false), Err(KernelError::NotInited));
        assert_eq!(check_export_access(&table, request, format, false), Ok(()));
    }

    #[test]
    fn test_non_exportable() {
        let mut table = ObjectTable::new(256, 256, 13).unwrap();
        let cert = add(&mut table, SubTypeA::CERT_CERT, true);
        table.get_mut(cert).unwrap().flags.insert(ObjectFlags::NONEXPORTABLE);
        assert_eq!(
            check_export_access(&table, cert, ExportFormat::Certificate as i32, false),
            Err(KernelError::Permission)
        );
    }
}
