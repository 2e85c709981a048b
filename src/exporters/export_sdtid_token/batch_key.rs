/// PKCS#1 DER RSA-1024 key that signs every sdtid trailer.
pub(super) const BATCH_PRIVATE_KEY: [u8; 592] = [
    0x30, 0x82, 0x02, 0x4c, 0x02, 0x01, 0x00, 0x02, 0x81, 0x81, 0x00, 0xdd, 0xa1, 0xee, 0xa6, 0xd7,
    0x66, 0xbb, 0xeb, 0xe2, 0x96, 0x0b, 0xeb, 0x19, 0x75, 0x44, 0x2b, 0x97, 0x1f, 0x25, 0x66, 0xb5,
    0xc6, 0x03, 0x8d, 0x0f, 0xbb, 0x86, 0x91, 0xbb, 0x40, 0x04, 0xf9, 0x36, 0x4d, 0x04, 0xe7, 0x72,
    0x4e, 0xca, 0x59, 0x84, 0xda, 0x2c, 0x64, 0xf2, 0xe5, 0x5f, 0xb4, 0x47, 0xc6, 0xf1, 0xe1, 0x53,
    0xa5, 0xea, 0x15, 0x6d, 0xb4, 0x58, 0x51, 0xa4, 0xdd, 0x46, 0xc1, 0x22, 0x5f, 0xa1, 0x5c, 0xa5,
    0xfb, 0x83, 0x9e, 0x72, 0x2b, 0xc0, 0xd4, 0x46, 0x69, 0x8e, 0x01, 0x35, 0x2c, 0x3f, 0x82, 0x57,
    0x42, 0xf1, 0x38, 0x50, 0xc3, 0xf0, 0x6c, 0x1e, 0x28, 0xd1, 0x11, 0xe1, 0x32, 0xb5, 0x2c, 0xd0,
    0x57, 0x06, 0x33, 0x54, 0xa3, 0x3a, 0x8e, 0x48, 0x26, 0xfa, 0x0b, 0xf1, 0x85, 0x52, 0xe8, 0xe8,
    0x3e, 0x07, 0x6f, 0x54, 0x79, 0x68, 0xfe, 0x53, 0xc0, 0x01, 0x7b, 0x02, 0x03, 0x01, 0x00, 0x01,
    0x02, 0x71, 0x00, 0xca, 0x45, 0x93, 0xad, 0x29, 0x41, 0x55, 0x98, 0xbe, 0xbe, 0xfa, 0x39, 0xa2,
    0x8e, 0x67, 0x9c, 0xf0, 0xdb, 0x38, 0x23, 0x39, 0x1a, 0x72, 0xfb, 0x36, 0xb4, 0x8a, 0xe8, 0x4d,
    0xe0, 0xeb, 0xa9, 0x16, 0x69, 0xcc, 0x63, 0xfe, 0xea, 0xf1, 0xba, 0x29, 0x89, 0x84, 0xa2, 0xcd,
    0x1b, 0x91, 0xf0, 0xd2, 0xe1, 0x3a, 0xb7, 0xce, 0xc3, 0xc9, 0x93, 0xac, 0xff, 0xbe, 0xeb, 0x24,
    0x6f, 0xde, 0xb5, 0x8a, 0x37, 0xe2, 0x1f, 0xd4, 0x1e, 0x0b, 0x2e, 0xc4, 0xaf, 0x02, 0x73, 0xa7,
    0xda, 0x33, 0x40, 0xa2, 0x22, 0xdc, 0x73, 0x63, 0x4b, 0xf2, 0xbd, 0xd0, 0x76, 0x18, 0xc8, 0xc5,
    0xc6, 0x5a, 0xe7, 0x4a, 0xa9, 0x2f, 0xbb, 0xe1, 0xae, 0xe7, 0x3a, 0xcf, 0xd6, 0x4f, 0xa0, 0x58,
    0x28, 0x3e, 0xe0, 0x02, 0x41, 0x00, 0xf7, 0x31, 0xfd, 0xe2, 0x7f, 0x4f, 0x9e, 0x3a, 0x61, 0x2e,
    0x5d, 0x53, 0x1c, 0xc1, 0x9d, 0xc8, 0xa1, 0x69, 0xba, 0xe0, 0xc3, 0x01, 0x7e, 0x3d, 0xbe, 0xe0,
    0x56, 0x81, 0x9c, 0x16, 0xe2, 0x53, 0x0f, 0xdc, 0xb1, 0xb6, 0xd1, 0x4a, 0xa2, 0x9c, 0x1c, 0x2e,
    0x18, 0x53, 0x8d, 0x4e, 0x74, 0xe5, 0xb1, 0xd7, 0x69, 0xda, 0xf7, 0xff, 0xf5, 0xa3, 0x32, 0xd2,
    0x37, 0x84, 0xe7, 0x86, 0xf0, 0x37, 0x02, 0x41, 0x00, 0xe5, 0x86, 0xd9, 0xde, 0x9e, 0xdd, 0x7a,
    0xbe, 0xb8, 0x0f, 0x2e, 0x2e, 0x34, 0x77, 0xd5, 0x89, 0x12, 0x29, 0x47, 0xbd, 0xe1, 0x4c, 0xc6,
    0x28, 0xa9, 0x42, 0x38, 0x48, 0xa4, 0x47, 0xb8, 0xc2, 0x0b, 0xf8, 0x93, 0xe6, 0x81, 0x40, 0xe9,
    0x04, 0xe1, 0x4f, 0x74, 0x46, 0x93, 0xfa, 0xeb, 0x40, 0x2f, 0x6c, 0x13, 0xf3, 0x70, 0x0f, 0xec,
    0x3b, 0x59, 0xa4, 0xf6, 0x68, 0x4b, 0xcd, 0x6e, 0xdd, 0x02, 0x40, 0x33, 0xe9, 0x70, 0xba, 0xd7,
    0x27, 0x9e, 0x3f, 0xfe, 0x56, 0xa1, 0x4c, 0xa9, 0xf6, 0x53, 0x2f, 0x66, 0x0e, 0x71, 0x2b, 0x70,
    0x68, 0x68, 0xdd, 0x88, 0xaf, 0x4e, 0x1b, 0x6b, 0xef, 0x36, 0x5a, 0x61, 0x33, 0x64, 0xb2, 0xd2,
    0xe3, 0x0c, 0xa1, 0x22, 0x1d, 0xe0, 0x07, 0xf3, 0xdd, 0xed, 0x18, 0xab, 0xaf, 0x64, 0x50, 0x92,
    0xd2, 0x53, 0x00, 0x91, 0xd4, 0xa9, 0xca, 0x24, 0x61, 0x27, 0x23, 0x02, 0x40, 0x39, 0x3c, 0xba,
    0xa2, 0x08, 0x6d, 0xe4, 0xc9, 0x20, 0xaf, 0x30, 0x6d, 0xf7, 0x49, 0x96, 0xe7, 0x7a, 0xae, 0xee,
    0xa4, 0x0c, 0x46, 0x0f, 0xf8, 0x5d, 0xd5, 0x14, 0xa2, 0x10, 0xcd, 0x8d, 0xe6, 0x5e, 0x03, 0xdc,
    0x26, 0x14, 0x3f, 0x72, 0x9c, 0x73, 0xef, 0x53, 0x68, 0xb2, 0x48, 0x55, 0x58, 0x09, 0x3b, 0x63,
    0x72, 0x46, 0x94, 0xc1, 0xed, 0x3e, 0xfa, 0xa3, 0x33, 0xf9, 0x0b, 0x3e, 0xc5, 0x02, 0x41, 0x00,
    0x89, 0x0b, 0xa9, 0x1d, 0xaf, 0x26, 0xc4, 0x50, 0xf4, 0xae, 0x69, 0x61, 0x85, 0xa5, 0x82, 0x62,
    0x25, 0x81, 0x4f, 0x02, 0xc7, 0x9a, 0x0c, 0x64, 0x00, 0xc4, 0x8d, 0x5d, 0x40, 0x95, 0x5c, 0x99,
    0x70, 0xb7, 0x5b, 0x79, 0x86, 0xd9, 0xeb, 0xa4, 0x72, 0x6d, 0xee, 0x01, 0xdc, 0x41, 0x88, 0x27,
    0x21, 0x3f, 0x5a, 0x55, 0x9b, 0x1f, 0xd6, 0xe5, 0xdd, 0x38, 0x83, 0xb4, 0xa4, 0x22, 0xac, 0x8e,
];

/// X.509 certificate copied into `<BatchCertificate>`. Its modulus does not
/// match `BATCH_PRIVATE_KEY`; readers never check it.
pub(super) const BATCH_CERTIFICATE: [u8; 637] = [
    0x30, 0x82, 0x02, 0x79, 0x30, 0x82, 0x01, 0x61, 0xa0, 0x03, 0x02, 0x01, 0x02, 0x02, 0x10, 0x33,
    0x43, 0x45, 0x35, 0x35, 0x38, 0x35, 0x33, 0x33, 0x30, 0x39, 0x46, 0x38, 0x31, 0x33, 0x30, 0x30,
    0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x04, 0x05, 0x00, 0x30, 0x41,
    0x31, 0x3f, 0x30, 0x3d, 0x06, 0x03, 0x55, 0x04, 0x03, 0x13, 0x36, 0x53, 0x65, 0x63, 0x75, 0x72,
    0x69, 0x74, 0x79, 0x20, 0x44, 0x79, 0x6e, 0x61, 0x6d, 0x69, 0x63, 0x73, 0x20, 0x54, 0x65, 0x63,
    0x68, 0x6e, 0x6f, 0x6c, 0x6f, 0x67, 0x69, 0x65, 0x73, 0x2c, 0x20, 0x49, 0x6e, 0x63, 0x2e, 0x20,
    0x50, 0x72, 0x69, 0x6d, 0x61, 0x72, 0x79, 0x20, 0x43, 0x41, 0x20, 0x52, 0x6f, 0x6f, 0x74, 0x20,
    0x31, 0x30, 0x1e, 0x17, 0x0d, 0x30, 0x32, 0x30, 0x35, 0x31, 0x37, 0x31, 0x39, 0x32, 0x31, 0x35,
    0x35, 0x5a, 0x17, 0x0d, 0x32, 0x32, 0x30, 0x35, 0x31, 0x32, 0x31, 0x39, 0x32, 0x31, 0x35, 0x35,
    0x5a, 0x30, 0x34, 0x31, 0x32, 0x30, 0x30, 0x06, 0x03, 0x55, 0x04, 0x03, 0x13, 0x29, 0x53, 0x65,
    0x63, 0x75, 0x72, 0x69, 0x74, 0x79, 0x20, 0x44, 0x79, 0x6e, 0x61, 0x6d, 0x69, 0x63, 0x73, 0x20,
    0x54, 0x65, 0x63, 0x68, 0x6e, 0x6f, 0x6c, 0x6f, 0x67, 0x69, 0x65, 0x73, 0x20, 0x41, 0x43, 0x45,
    0x2f, 0x53, 0x65, 0x72, 0x76, 0x65, 0x72, 0x30, 0x81, 0x9f, 0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86,
    0x48, 0x86, 0xf7, 0x0d, 0x01, 0x01, 0x01, 0x05, 0x00, 0x03, 0x81, 0x8d, 0x00, 0x30, 0x81, 0x89,
    0x02, 0x81, 0x81, 0x00, 0xd6, 0x7a, 0x75, 0x0c, 0x87, 0xf7, 0x1c, 0xe1, 0xc0, 0x2b, 0x66, 0xa1,
    0x71, 0x1c, 0xd9, 0x08, 0x9b, 0x2a, 0x20, 0x2d, 0x50, 0x30, 0x4a, 0xad, 0xb1, 0xd6, 0xa7, 0x29,
    0x21, 0x27, 0xe4, 0x21, 0xad, 0x2c, 0x27, 0x4b, 0xbf, 0xd2, 0xdb, 0x2d, 0x46, 0x28, 0xe9, 0xc4,
    0x31, 0x29, 0x22, 0x6d, 0xc2, 0xf8, 0xa0, 0xa5, 0xe0, 0xe0, 0x04, 0x06, 0xff, 0x51, 0x87, 0x14,
    0x35, 0x7c, 0xbf, 0xed, 0xd6, 0x3b, 0xac, 0x0e, 0x56, 0xa5, 0x89, 0x6c, 0x68, 0x0f, 0x61, 0xe4,
    0x2f, 0x6a, 0xcc, 0xf3, 0x01, 0x1f, 0x15, 0x46, 0x48, 0x87, 0xb9, 0x93, 0xad, 0x6e, 0x51, 0xb0,
    0x30, 0x74, 0x58, 0x42, 0x31, 0xf2, 0xe1, 0xef, 0xbe, 0xb0, 0x47, 0xff, 0xd5, 0x67, 0xb7, 0x2e,
    0xca, 0x9a, 0x39, 0x77, 0x77, 0x02, 0x6e, 0xf8, 0x07, 0x1b, 0x0a, 0xb0, 0xe1, 0x9b, 0x84, 0x09,
    0xb2, 0xaf, 0x38, 0xd3, 0x02, 0x03, 0x01, 0x00, 0x01, 0x30, 0x0d, 0x06, 0x09, 0x2a, 0x86, 0x48,
    0x86, 0xf7, 0x0d, 0x01, 0x01, 0x04, 0x05, 0x00, 0x03, 0x82, 0x01, 0x01, 0x00, 0xab, 0xc3, 0x0c,
    0x26, 0xcd, 0x52, 0x73, 0x3c, 0x29, 0x7d, 0xc6, 0x6a, 0x9f, 0xd9, 0x68, 0x33, 0xed, 0x91, 0x84,
    0x59, 0x8d, 0xd4, 0x86, 0x62, 0x5f, 0x27, 0xaf, 0xcf, 0x55, 0x6f, 0x18, 0x3f, 0x46, 0x52, 0xb9,
    0x4b, 0x6a, 0x59, 0xbf, 0x12, 0xdf, 0x7c, 0xf7, 0x34, 0x7f, 0x75, 0x58, 0x5c, 0x88, 0x65, 0xe6,
    0x00, 0x0c, 0x58, 0x9d, 0x5f, 0xcc, 0xa1, 0x99, 0xac, 0x86, 0x35, 0xe8, 0xce, 0x62, 0x60, 0x8d,
    0x19, 0x9f, 0xaa, 0xa1, 0xcb, 0x4b, 0x8e, 0x94, 0x27, 0xd9, 0xcb, 0x67, 0x60, 0x6e, 0x11, 0x57,
    0x2b, 0x1e, 0x79, 0xfa, 0x7f, 0xd9, 0x9e, 0x22, 0x37, 0x8c, 0x5a, 0x6f, 0x83, 0xbe, 0x1f, 0xbc,
    0x56, 0x2f, 0x4a, 0x24, 0xe2, 0xe8, 0xcd, 0x86, 0xc3, 0xa1, 0xa5, 0x0c, 0x9b, 0xee, 0x45, 0xef,
    0x2c, 0x0a, 0xb1, 0x4b, 0x81, 0x3d, 0x14, 0x89, 0xd7, 0x29, 0x06, 0x24, 0x6e, 0x9d, 0x38, 0x20,
    0x59, 0x94, 0x91, 0xa6, 0x33, 0x79, 0x1b, 0x67, 0x9e, 0x25, 0x44, 0x02, 0xb6, 0x4d, 0x87, 0x2e,
    0xd8, 0x93, 0x36, 0xd6, 0x2e, 0xc1, 0x29, 0xd7, 0x84, 0xf7, 0x12, 0x2d, 0xc9, 0xa6, 0xc9, 0xcc,
    0x49, 0x37, 0x40, 0x2b, 0x17, 0xd1, 0xea, 0xd8, 0xee, 0x1d, 0xd5, 0xff, 0xfa, 0x24, 0x21, 0xf2,
    0x96, 0x2e, 0x1f, 0x0b, 0x89, 0xea, 0x16, 0x6d, 0x5e, 0x3e, 0x56, 0xda, 0xd0, 0x12, 0x88, 0x94,
    0xc3, 0x2a, 0x9d, 0x62, 0xcc, 0x30, 0x80, 0xc3, 0xb2, 0x46, 0x22, 0xae, 0x19, 0x39, 0x24, 0xdc,
    0x38, 0x47, 0x76, 0x8a, 0xa1, 0x1b, 0xc4, 0xaa, 0x1d, 0x2c, 0x64, 0x3e, 0xda, 0x38, 0xda, 0x11,
    0x27, 0xa4, 0xec, 0x7d, 0x8f, 0x6a, 0xea, 0x72, 0xc3, 0x96, 0xa2, 0xcb, 0xcd, 0xc9, 0xf9, 0xbd,
    0x9f, 0x09, 0x2a, 0x25, 0xf8, 0x6e, 0x24, 0x29, 0x4b, 0xc0, 0xec, 0xf0, 0xe5,
];
