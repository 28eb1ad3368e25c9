//! Assigned numbers used on the wire.
//!
//! See <https://www.iana.org/assignments/kerberos-parameters/kerberos-parameters.xhtml>.

/// Encryption type identifiers.
pub mod etype_id {
    pub const DES_CBC_CRC: i32 = 1;
    pub const DES_CBC_MD4: i32 = 2;
    pub const DES_CBC_MD5: i32 = 3;
    pub const DES3_CBC_SHA1_KD: i32 = 16;
    pub const AES128_CTS_HMAC_SHA1_96: i32 = 17;
    pub const AES256_CTS_HMAC_SHA1_96: i32 = 18;
    pub const RC4_HMAC: i32 = 23;
}

/// Checksum type identifiers.
pub mod chksum_type {
    pub const CRC32: i32 = 1;
    pub const RSA_MD4: i32 = 2;
    pub const RSA_MD5: i32 = 7;
    pub const RSA_MD5_DES: i32 = 8;
    pub const HMAC_SHA1_DES3_KD: i32 = 12;
    pub const HMAC_SHA1_96_AES128: i32 = 15;
    pub const HMAC_SHA1_96_AES256: i32 = 16;
}

/// Key usage numbers from RFC 4120 section 7.5.1.
pub mod key_usage {
    pub const AS_REQ_PA_ENC_TIMESTAMP: u32 = 1;
    pub const KDC_REP_TICKET: u32 = 2;
    pub const AS_REP_ENCPART: u32 = 3;
    pub const TGS_REQ_KDC_REQ_BODY_AUTHDATA_SESSION_KEY: u32 = 4;
    pub const TGS_REQ_KDC_REQ_BODY_AUTHDATA_SUB_KEY: u32 = 5;
    pub const TGS_REQ_PA_TGS_REQ_AP_REQ_AUTHENTICATOR_CHKSUM: u32 = 6;
    pub const TGS_REQ_PA_TGS_REQ_AP_REQ_AUTHENTICATOR: u32 = 7;
    pub const TGS_REP_ENCPART_SESSION_KEY: u32 = 8;
    pub const TGS_REP_ENCPART_AUTHENTICATOR_SUB_KEY: u32 = 9;
    pub const AP_REQ_AUTHENTICATOR_CHKSUM: u32 = 10;
    pub const AP_REQ_AUTHENTICATOR: u32 = 11;
    pub const AP_REP_ENCPART: u32 = 12;
    pub const KRB_PRIV_ENCPART: u32 = 13;
    pub const KRB_CRED_ENCPART: u32 = 14;
    pub const KRB_SAFE_CHKSUM: u32 = 15;
    pub const KERB_NON_KERB_SALT: u32 = 16;
    pub const KERB_NON_KERB_CKSUM_SALT: u32 = 17;
    pub const GSSAPI_ACCEPTOR_SEAL: u32 = 22;
    pub const GSSAPI_ACCEPTOR_SIGN: u32 = 23;
    pub const GSSAPI_INITIATOR_SEAL: u32 = 24;
    pub const GSSAPI_INITIATOR_SIGN: u32 = 25;

    /// Every usage number above, in ascending order.
    pub const ALL: [u32; 21] = [
        AS_REQ_PA_ENC_TIMESTAMP,
        KDC_REP_TICKET,
        AS_REP_ENCPART,
        TGS_REQ_KDC_REQ_BODY_AUTHDATA_SESSION_KEY,
        TGS_REQ_KDC_REQ_BODY_AUTHDATA_SUB_KEY,
        TGS_REQ_PA_TGS_REQ_AP_REQ_AUTHENTICATOR_CHKSUM,
        TGS_REQ_PA_TGS_REQ_AP_REQ_AUTHENTICATOR,
        TGS_REP_ENCPART_SESSION_KEY,
        TGS_REP_ENCPART_AUTHENTICATOR_SUB_KEY,
        AP_REQ_AUTHENTICATOR_CHKSUM,
        AP_REQ_AUTHENTICATOR,
        AP_REP_ENCPART,
        KRB_PRIV_ENCPART,
        KRB_CRED_ENCPART,
        KRB_SAFE_CHKSUM,
        KERB_NON_KERB_SALT,
        KERB_NON_KERB_CKSUM_SALT,
        GSSAPI_ACCEPTOR_SEAL,
        GSSAPI_ACCEPTOR_SIGN,
        GSSAPI_INITIATOR_SEAL,
        GSSAPI_INITIATOR_SIGN,
    ];
}
