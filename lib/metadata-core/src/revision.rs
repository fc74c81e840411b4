//! Revision fingerprint over a set of exported services.
//!
//! Every service contributes its service key, and every method a
//! `service_key$method` token. The tokens are sorted byte-wise, each is
//! checksummed with CRC-32 (IEEE) and the checksums are summed as a wrapping
//! `u64`. The decimal form of the sum is the revision. Peers computing the
//! same protocol must sort the same way or the fingerprints diverge.
//!
//! Empty method names are skipped. A service without a `methods` parameter
//! parses to a single empty name and so contributes only its service key,
//! never a bare `service_key$` token.
//!
//! The candidate list starts empty. Padding it with empty strings would not
//! change the result, because the CRC-32 of an empty input is zero.

use crate::key::METHOD_SEPARATOR;
use crate::service_info::ServiceInfo;

/// Revision of an application exporting nothing
pub const EMPTY_REVISION: &str = "0";

/// Collect the sorted candidate tokens for a set of services
pub fn candidates<'a, I>(services: I) -> Vec<String>
where
    I: IntoIterator<Item = &'a ServiceInfo>,
{
    let mut candidates = Vec::new();
    for service in services {
        let service_key = service.service_key();
        candidates.push(service_key.to_string());
        for method in service.methods() {
            // A missing methods parameter yields a single empty name
            if method.is_empty() {
                continue;
            }
            candidates.push(format!("{}{}{}", service_key, METHOD_SEPARATOR, method));
        }
    }
    candidates.sort_unstable();
    candidates
}

/// Sum the CRC-32 of each candidate into a wrapping 64-bit accumulator
pub fn checksum_sum<S: AsRef<str>>(candidates: &[S]) -> u64 {
    candidates.iter().fold(0u64, |sum, candidate| {
        sum.wrapping_add(u64::from(crc32fast::hash(candidate.as_ref().as_bytes())))
    })
}

/// Compute the revision string for a set of services
pub fn calculate<'a, I>(services: I) -> String
where
    I: IntoIterator<Item = &'a ServiceInfo>,
{
    let candidates = candidates(services);
    if candidates.is_empty() {
        return EMPTY_REVISION.to_string();
    }
    checksum_sum(&candidates).to_string()
}
