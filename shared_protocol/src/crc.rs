/// CRC-16/X25 (a.k.a. CRC-16/IBM-SDLC)
/// Parameters:
/// - Poly:    0x1021 (processed reflected as 0x8408)
/// - Init:    0xFFFF
/// - RefIn:   true
/// - RefOut:  true
/// - XorOut:  0xFFFF
///
/// Check value for ASCII "123456789" is 0x906E.
pub fn crc16_x25(data: &[u8]) -> u16 {
    const POLY_REFLECTED: u16 = 0x8408;

    let mut crc: u16 = 0xFFFF;
    for &byte in data {
        crc ^= byte as u16;
        for _ in 0..8 {
            if crc & 0x0001 != 0 {
                crc = (crc >> 1) ^ POLY_REFLECTED;
            } else {
                crc >>= 1;
            }
        }
    }
    crc ^ 0xFFFF
}
