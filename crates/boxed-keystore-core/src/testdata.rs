//! Shared test fixtures: GFI test certificates and keys.

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;

use crate::material::{Certificate, PrivateKey};

/// Supplier Z1, role 1, digitalSignature, EUI 90b3d51f30000001.
pub const ORG_90B3D51F30000001_DS_CERT: &str = "MIIBkjCCATigAwIBAgIQRpr+wufAyq7IpAB2m3AryDAKBggqhkjOPQQDAjAaMQswCQYDVQQLEwIwNzELMAkGA1UEAxMCWjEwHhcNMTUxMDMwMDAwMDAwWhcNMjUxMDI5MjM1OTU5WjAhMQswCQYDVQQLDAIwMTESMBAGA1UELQMJAJCz1R8wAAABMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEX9CL9uFDiw2je8JkE1vpZfLVIrsqJmM1OgI57QIKhacanY2F2HzDikhNorxT729KFo0M6IYcQKVDxM0VsnZm+aNZMFcwDgYDVR0PAQH/BAQDAgeAMBEGA1UdDgQKBAhB+supVvg9hzAdBgNVHSABAf8EEzARMA8GDSqGOgABhI+5DwECAQQwEwYDVR0jBAwwCoAIT1aI1+yTO+IwCgYIKoZIzj0EAwIDSAAwRQIgFUzuFGjfksF5+XNiopwuwpQJobd1GmBl9SKG+6d7y9oCIQCLDPSUJlfX4clmZOLPpTSroslJqBT+gh8fKXK0Rhbbtw==";
pub const ORG_90B3D51F30000001_DS_KEY: &str = "MIGHAgEAMBMGByqGSM49AgEGCCqGSM49AwEHBG0wawIBAQQgswDOxJfzLJjgQ7ioz/Aq1B50g3eV6MORa+c+ekzHRLihRANCAARf0Iv24UOLDaN7wmQTW+ll8tUiuyomYzU6AjntAgqFpxqdjYXYfMOKSE2ivFPvb0oWjQzohhxApUPEzRWydmb5";
pub const ORG_90B3D51F30000001_DS_SERIAL: &str = "93850740595185438017946775787620281288";

/// GIT test supplier, role 2, digitalSignature, EUI 90b3d51f30010000.
pub const ORG_90B3D51F30010000_DS_CERT: &str = "MIIBrDCCAVKgAwIBAgIQT7xSUgGh11hsG8HEc03rnzAKBggqhkjOPQQDAjAaMQswCQYDVQQLEwIwNzELMAkGA1UEAxMCWjEwHhcNMTUxMDMwMDAwMDAwWhcNMjUxMDI5MjM1OTU5WjA7MRgwFgYDVQQDDA9HSVRURVNUU1VQUExJRVIxCzAJBgNVBAsMAjAyMRIwEAYDVQQtAwkAkLPVHzABAAAwWTATBgcqhkjOPQIBBggqhkjOPQMBBwNCAAQwwqtaDRMXJv+9qA55KUzDdTRDKj5CRAW5ejq6D/x53OcpslF1Y8t9lYJ+TFC0jLo9h9WJPFG5bYfDReNxf4weo1kwVzAOBgNVHQ8BAf8EBAMCB4AwEQYDVR0OBAoECESJl5LRlvS4MB0GA1UdIAEB/wQTMBEwDwYNKoY6AAGEj7kPAQIBBDATBgNVHSMEDDAKgAhPVojX7JM74jAKBggqhkjOPQQDAgNIADBFAiEA39CQ51c+r1+oLhqn242f7VEYObV1LVXRAJHyUP3xiiICIF637Dax9BM+UVV9M7WcSe9rvRDpqksdzZKOZbPprdHF";
pub const ORG_90B3D51F30010000_DS_KEY: &str = "MIGHAgEAMBMGByqGSM49AgEGCCqGSM49AwEHBG0wawIBAQQgOeBFQ8dm5wsYOZQDxySQxQGcGfs6sf1pmawsQTd5enqhRANCAAQwwqtaDRMXJv+9qA55KUzDdTRDKj5CRAW5ejq6D/x53OcpslF1Y8t9lYJ+TFC0jLo9h9WJPFG5bYfDReNxf4we";
pub const ORG_90B3D51F30010000_DS_SERIAL: &str = "105986833131214866166891566273223584671";

/// GIT test supplier, role 2, keyAgreement, EUI 90b3d51f30010000.
pub const ORG_90B3D51F30010000_KA_CERT: &str = "MIIBkjCCATigAwIBAgIQOzYmV3Meayu+B4ZQz6FPFTAKBggqhkjOPQQDAjAaMQswCQYDVQQLEwIwNzELMAkGA1UEAxMCWjEwHhcNMTUxMDMwMDAwMDAwWhcNMjUxMDI5MjM1OTU5WjAhMQswCQYDVQQLDAIwMjESMBAGA1UELQMJAJCz1R8wAQAAMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEknT/+KOvVtawFtOo+mDaPleVUespWBnIDrekPzByKyJVBCheSlF2uWM027cuoM/AycbkCgrjwok3w0JY8OhAuqNZMFcwDgYDVR0PAQH/BAQDAgMIMBEGA1UdDgQKBAhAW4xiaH2PcDAdBgNVHSABAf8EEzARMA8GDSqGOgABhI+5DwECAQQwEwYDVR0jBAwwCoAIT1aI1+yTO+IwCgYIKoZIzj0EAwIDSAAwRQIgFr/75lBWSxc8gzYM2B2KIo9qDgZml43a49UDQDJxy9cCIQCcncpTfMwNiHEJMBqualHKnx28X5I+HWDdRugWzqYbDA==";
pub const ORG_90B3D51F30010000_KA_KEY: &str = "MIGHAgEAMBMGByqGSM49AgEGCCqGSM49AwEHBG0wawIBAQQgQIg5kNpbNy3E7JbHa1dr9dQgbjv9NMv2C2JEjx+bpUShRANCAASSdP/4o69W1rAW06j6YNo+V5VR6ylYGcgOt6Q/MHIrIlUEKF5KUXa5YzTbty6gz8DJxuQKCuPCiTfDQljw6EC6";
pub const ORG_90B3D51F30010000_KA_SERIAL: &str = "78705613441713544701898588866012598037";

/// XML signing certificate, role 0x87, digitalSignature, no key.
pub const ORG_90B3D51F30010000_XMLSIGN_CERT: &str = "MIIBfzCCASWgAwIBAgIQFL5K0uodDk7H9xVr0kYkpzAKBggqhkjOPQQDAjAaMQswCQYDVQQLDAIwNzELMAkGA1UEAwwCWjEwIBcNMTgwMTAxMDAwMDAwWhgPMjExODAxMDEwMDAwMDBaMCExCzAJBgNVBAsMAjg3MRIwEAYDVQQtAwkAkLPVHzABAAAwWTATBgcqhkjOPQIBBggqhkjOPQMBBwNCAASfiKvSIFxEFeHhGzLWEiBlfi045xQ/m4hL+s1+SKlje0Vb//LRzGVaUobobAJaVN5cRd43ZiioDY+0cTTwvUcuo0QwQjAdBgNVHSABAf8EEzARMA8GDSqGOgABhI+5DwECAQQwEQYDVR0OBAoECEusYLdMsaDbMA4GA1UdDwEB/wQEAwIHgDAKBggqhkjOPQQDAgNIADBFAiEA4LXpqbs5lRubjOM4FtEy7rowBKUyf62/hreDAIn3fEoCIDVnSEzk+wBn2NJ392d+S9sd03Wca5m4YVgyb2GTeX8c";

pub const ORG_90B3D51F30010000_XMLSIGN_SERIAL: &str = "27572613927499351639968579586655397031";

/// Device certificate, digitalSignature, EUI 00db1234567890a4.
pub const DEVICE_00DB1234567890A4_DS_CERT: &str = "MIIBoTCCAUagAwIBAgIQNkGyIlgJ/7uoGz6OMgqmzzAKBggqhkjOPQQDAjAPMQ0wCwYDVQQDEwRFMzU3MCAXDTE2MDQwNjAwMDAwMFoYDzk5OTkxMjMxMjM1OTU5WjAAMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAEys++enzkr2yb4qwOP4Sf/qIJuZegcGYZULUXsSLqDUtkG4DeCKMTe090mEa57ZrHbH3wvfjqeEc1BOm7Scqmx6OBkDCBjTAOBgNVHQ8BAf8EBAMCB4AwEQYDVR0OBAoECE/HRnKgmyJhMDUGA1UdEQEB/wQrMCmgJwYIKwYBBQUHCASgGzAZBg0qhjoAAYSPuQ8BAgIBBAgA2xI0VniQpDAcBgNVHSABAf8EEjAQMA4GDCqGOgAB7e5AAQIBBDATBgNVHSMEDDAKgAhH1ArzQSkEoDAKBggqhkjOPQQDAgNJADBGAiEAivHtRK3V4zLGY59T//SnQttB74xz/9A+aRUV5HKoH8oCIQDVfXKeMEihJxkOpSGzvT9XEXSU+uOlSTSs4Mmk3NTTGA==";
pub const DEVICE_00DB1234567890A4_DS_KEY: &str = "MIGHAgEAMBMGByqGSM49AgEGCCqGSM49AwEHBG0wawIBAQQgASmcyoHIuO4eHiN0AIf2MYX0N+aQPMiuiAY7LdwrMKmhRANCAATKz756fOSvbJvirA4/hJ/+ogm5l6BwZhlQtRexIuoNS2QbgN4IoxN7T3SYRrntmsdsffC9+Op4RzUE6btJyqbH";
pub const DEVICE_00DB1234567890A4_DS_SERIAL: &str = "72119424058103965276745519964518786767";

/// Device certificate, keyAgreement, EUI 00db1234567890a4.
pub const DEVICE_00DB1234567890A4_KA_CERT: &str = "MIIBoDCCAUagAwIBAgIQSiNt7Xc0UzIiYPfefETBZjAKBggqhkjOPQQDAjAPMQ0wCwYDVQQDEwRFMzU3MCAXDTE2MDQwNjAwMDAwMFoYDzk5OTkxMjMxMjM1OTU5WjAAMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE4WwfjNZwHoDL4DG1QJVIbyWwWn6BKt8SJ2ujFyakONVNyEfnK2E3UgibkuL4hT0+Q84PoO9SDlnsMbcsoUkI06OBkDCBjTAOBgNVHQ8BAf8EBAMCAwgwEQYDVR0OBAoECEcMHpw5Eh7IMDUGA1UdEQEB/wQrMCmgJwYIKwYBBQUHCASgGzAZBg0qhjoAAYSPuQ8BAgIBBAgA2xI0VniQpDAcBgNVHSABAf8EEjAQMA4GDCqGOgAB7e5AAQIBBDATBgNVHSMEDDAKgAhH1ArzQSkEoDAKBggqhkjOPQQDAgNIADBFAiBtih3M74gET/t+qE6aRYvvCQfYGqUK26lzVBFwhaxFywIhAMWtZ3u/bQs4oFbKuXDQreKUFw2W7kRVbOa8NbYFXR92";
pub const DEVICE_00DB1234567890A4_KA_KEY: &str = "MIGHAgEAMBMGByqGSM49AgEGCCqGSM49AwEHBG0wawIBAQQgVHfYJyrMcZGMfeZK/lNvp99GmjC+qzdW5rJMq4M4cr2hRANCAAThbB+M1nAegMvgMbVAlUhvJbBafoEq3xIna6MXJqQ41U3IR+crYTdSCJuS4viFPT5Dzg+g71IOWewxtyyhSQjT";
pub const DEVICE_00DB1234567890A4_KA_SERIAL: &str = "98546831674745780667197067843932045670";

/// Device certificate, keyAgreement, EUI 88738457002f966c,
/// serial 0x13e6e3409c880fdbe71a429acf375746.
pub const DEVICE_88738457002F966C_KA_CERT: &str ="MIIBnDCCAUGgAwIBAgIQE+bjQJyID9vnGkKazzdXRjAKBggqhkjOPQQDAjAhMQswCQYDVQQLDAIwNDESMBAGA1UELQMJAJCz1R8wAAACMCAXDTIyMDYyMzEzNDE1M1oYDzk5OTkxMjMxMjM1OTU5WjAAMFkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDQgAE9poPzZqPf3B+zGH6+iom4+33eYBg3kAOqJu1iZVcQv51kkWxELt+kODSTwzIunNji8338r2rLo0hX7NtFwBbMKN6MHgwDgYDVR0PAQH/BAQDAgMIMDIGA1UdEQEB/wQoMCagJAYIKwYBBQUHCASgGDAWBgoqhjoAilwBAQIBBAiIc4RXAC+WbDAdBgNVHSABAf8EEzARMA8GDSqGOgABhI+5DwECAQQwEwYDVR0jBAwwCoAIQmk1NdPd4QEwCgYIKoZIzj0EAwIDSQAwRgIhAMU7lkl7VPekQ6aWz3wBdlr8hnEhuyryXucUXNGPGazYAiEApaMZlFoNDO59rJgZ9ZAjskjenTF0G7CMu+jjaw87nBw=";
pub const DEVICE_88738457002F966C_KA_SERIAL: &str = "26454169423402992117422501594622547782";

/// RSA-signed public web certificate (neither layout applies).
pub const HTTPS_CERT: &str = "MIIEUzCCAzugAwIBAgISBCg4mAiwPnQSxQjt3wL8sVEuMA0GCSqGSIb3DQEBCwUAMDIxCzAJBgNVBAYTAlVTMRYwFAYDVQQKEw1MZXQncyBFbmNyeXB0MQswCQYDVQQDEwJSMzAeFw0yMjA2MjgyMTA3MjRaFw0yMjA5MjYyMTA3MjNaMBIxEDAOBgNVBAMTB2xhcG8uaXQwWTATBgcqhkjOPQIBBggqhkjOPQMBBwNCAARliQaE++bzrSRNmBVbiiQg9Xm9Okka3VwCZmFSXbzIzEp/sk64BiIbaIB6zC6FVQ7aQFDYkSqiarR/0QuZaQeko4ICTDCCAkgwDgYDVR0PAQH/BAQDAgeAMB0GA1UdJQQWMBQGCCsGAQUFBwMBBggrBgEFBQcDAjAMBgNVHRMBAf8EAjAAMB0GA1UdDgQWBBQUpQr4+sfTEl9agWrE7ekjY5rVhTAfBgNVHSMEGDAWgBQULrMXt1hWy65QCUDmH6+dixTCxjBVBggrBgEFBQcBAQRJMEcwIQYIKwYBBQUHMAGGFWh0dHA6Ly9yMy5vLmxlbmNyLm9yZzAiBggrBgEFBQcwAoYWaHR0cDovL3IzLmkubGVuY3Iub3JnLzAdBgNVHREEFjAUggkqLmxhcG8uaXSCB2xhcG8uaXQwTAYDVR0gBEUwQzAIBgZngQwBAgEwNwYLKwYBBAGC3xMBAQEwKDAmBggrBgEFBQcCARYaaHR0cDovL2Nwcy5sZXRzZW5jcnlwdC5vcmcwggEDBgorBgEEAdZ5AgQCBIH0BIHxAO8AdgDfpV6raIJPH2yt7rhfTj5a6s2iEqRqXo47EsAgRFwqcwAAAYGsWt3QAAAEAwBHMEUCIGYSOc513T0WRQUfRD2FoljMCIeud/vRNQDNeiaXvvi5AiEA7CtzDy7p0DC8lrLxn6dwMzaUX/8iA9ChL2nvlYzyzcUAdQBGpVXrdfqRIDC1oolp9PN9ESxBdL79SbiFq/L8cP5tRwAAAYGsWt4vAAAEAwBGMEQCIHlb3NR242mygRgcltc1Tm4i5/1xklZvyD26Ar9JWGo0AiAFB42qQAcbbT2WXfoO96beXpff0hn8piUPuvML28ZBhTANBgkqhkiG9w0BAQsFAAOCAQEAP8ipkaImmJGPqAobhtpEr57nwhLRx8vmorTvfS1ZSU8i3/ESHlUMuC5jLDzIGefRS0oGNDC9eVDnFb9razEW3LWY/qi+5cKEo3ZmVaFFSp08j0RwsUK2D7DS5WF7Y5tLl0xbz9ySQ/GmLhM8Rsm53cwieXBH8spluXVEjRP6CEH25ouB0fqrRWX8ju5C4IyxOD8TMRo3SdHLmlNQBr1naMf05e++dcmRMK0z6Fjf9+F+MJZK/Wme8BOnR8UPregwq4HVXLuHFbfe7LWOL2iY/Bw+Cq2gJd00X9PHhSnbpdGjcBQVSEk5uyXhFvjm8dyO8JPau1aPPqou1izP8hIwHQ==";

pub fn decode(b64: &str) -> Vec<u8> {
    STANDARD.decode(b64).expect("fixture is valid base64")
}

pub fn cert(b64: &str) -> Certificate {
    Certificate::from_der(decode(b64)).expect("fixture is a valid certificate")
}

pub fn key(b64: &str) -> PrivateKey {
    PrivateKey::from_pkcs8_der(&decode(b64)).expect("fixture is a valid key")
}
