//! Namecheap wire format
//!
//! Requests are flat, form-encoded key/value lists; host records are sent
//! as indexed fields (`HostName1`, `RecordType1`, ...). Responses are XML
//! documents in the `http://api.namecheap.com/xml.response` namespace.
//!
//! ```xml
//! <ApiResponse Status="OK" xmlns="http://api.namecheap.com/xml.response">
//!   <Errors />
//!   <CommandResponse Type="namecheap.domains.dns.getHosts">
//!     <DomainDNSGetHostsResult Domain="example.com">
//!       <host HostId="1" Name="home" Type="A" Address="1.2.3.4" MXPref="10" TTL="60" />
//!     </DomainDNSGetHostsResult>
//!   </CommandResponse>
//! </ApiResponse>
//! ```

use ddns_core::record::DEFAULT_TTL;
use ddns_core::{Credentials, DomainName, Error, HostRecord, RecordSet, Result, SubmissionResult};
use roxmltree::{Document, Node};
use std::fmt;

/// XML namespace of every API response
pub const NAMESPACE: &str = "http://api.namecheap.com/xml.response";

/// API command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Read a domain's host records
    GetHosts,
    /// Replace a domain's host records
    SetHosts,
}

impl Command {
    pub fn as_str(&self) -> &'static str {
        match self {
            Command::GetHosts => "namecheap.domains.dns.getHosts",
            Command::SetHosts => "namecheap.domains.dns.setHosts",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request parameters in submission order
pub type Params = Vec<(String, String)>;

/// Build the request parameters for `command`
///
/// Records are numbered from 1 in record-set order. `getHosts` is sent with
/// an empty record set.
pub fn encode(
    domain: &DomainName,
    command: Command,
    credentials: &Credentials,
    records: &RecordSet,
) -> Params {
    let mut params: Params = vec![
        ("ApiUser".into(), credentials.api_user.clone()),
        ("ApiKey".into(), credentials.api_key.clone()),
        ("UserName".into(), credentials.account_username.clone()),
        ("ClientIp".into(), credentials.client_ip.clone()),
        ("Command".into(), command.as_str().into()),
        ("SLD".into(), domain.sld().into()),
        ("TLD".into(), domain.tld().into()),
    ];

    for (i, record) in records.iter().enumerate() {
        let n = i + 1;
        params.push((format!("HostName{n}"), record.host_name.clone()));
        params.push((format!("RecordType{n}"), record.record_type.clone()));
        params.push((format!("Address{n}"), record.address.clone()));
        params.push((format!("TTL{n}"), record.ttl.clone()));
        if let Some(mx_pref) = &record.mx_pref {
            params.push((format!("MXPref{n}"), mx_pref.clone()));
        }
    }

    params
}

/// Copy of `params` safe to log
pub fn redacted(params: &Params) -> Params {
    params
        .iter()
        .map(|(key, value)| {
            if key == "ApiKey" {
                (key.clone(), "<REDACTED>".to_string())
            } else {
                (key.clone(), value.clone())
            }
        })
        .collect()
}

/// Decode a `getHosts` response into a record set
///
/// A response with `Status="ERROR"` is a registrar error: treating it as an
/// empty record set would wipe the domain on the next submission.
pub fn decode(raw: &str) -> Result<RecordSet> {
    let doc = Document::parse(raw)
        .map_err(|e| Error::decode(format!("Unparsable XML: {}", e), raw))?;
    let root = api_response(&doc, raw)?;

    if root
        .attribute("Status")
        .is_some_and(|s| s.eq_ignore_ascii_case("ERROR"))
    {
        return Err(Error::registrar(error_messages(root), raw));
    }

    let result = root
        .descendants()
        .find(|n| n.has_tag_name((NAMESPACE, "DomainDNSGetHostsResult")))
        .ok_or_else(|| Error::decode("Missing DomainDNSGetHostsResult element", raw))?;

    result
        .descendants()
        .filter(|n| n.has_tag_name((NAMESPACE, "host")))
        .map(|n| host_record(n, raw))
        .collect()
}

/// Decode a `setHosts` response
///
/// Never fails: a document without a recognisable result element is a
/// failed submission with no error messages.
pub fn decode_result(raw: &str) -> SubmissionResult {
    let Ok(doc) = Document::parse(raw) else {
        return SubmissionResult::failed(Vec::new(), raw);
    };
    let root = doc.root_element();

    let success = root
        .descendants()
        .find(|n| n.has_tag_name((NAMESPACE, "DomainDNSSetHostsResult")))
        .and_then(|n| n.attribute("IsSuccess"))
        .is_some_and(|v| v.eq_ignore_ascii_case("true"));

    if success {
        SubmissionResult::succeeded(raw)
    } else {
        SubmissionResult::failed(error_messages(root), raw)
    }
}

fn api_response<'a, 'input>(doc: &'a Document<'input>, raw: &str) -> Result<Node<'a, 'input>> {
    let root = doc.root_element();
    if !root.has_tag_name((NAMESPACE, "ApiResponse")) {
        let tag = root.tag_name();
        return Err(Error::decode(
            format!(
                "Unexpected root element '{}' (namespace {:?}), expected ApiResponse in {}",
                tag.name(),
                tag.namespace(),
                NAMESPACE
            ),
            raw,
        ));
    }
    Ok(root)
}

fn host_record(node: Node<'_, '_>, raw: &str) -> Result<HostRecord> {
    let required = |name: &str| {
        node.attribute(name).ok_or_else(|| {
            Error::decode(format!("host element without {} attribute", name), raw)
        })
    };

    let record_type = required("Type")?;
    let mut record = HostRecord::new(
        required("Name")?,
        record_type,
        required("Address")?,
        node.attribute("TTL").unwrap_or(DEFAULT_TTL),
    );

    if record_type.eq_ignore_ascii_case("MX")
        && let Some(mx_pref) = node.attribute("MXPref")
    {
        record = record.with_mx_pref(mx_pref);
    }

    Ok(record)
}

fn error_messages(root: Node<'_, '_>) -> Vec<String> {
    root.children()
        .filter(|n| n.has_tag_name((NAMESPACE, "Errors")))
        .flat_map(|errors| errors.children())
        .filter(|n| n.has_tag_name((NAMESPACE, "Error")))
        .map(|n| n.text().unwrap_or_default().trim().to_string())
        .collect()
}
