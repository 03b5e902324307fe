//! Supported AWS regions.

use crate::error::AwsError;
use std::fmt;
use std::str::FromStr;

macro_rules! regions {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// An AWS region the facades may be pointed at.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Region {
            $(
                #[doc = $name]
                $variant,
            )+
        }

        impl Region {
            /// Every supported region, in declaration order.
            pub const ALL: &'static [Region] = &[$(Region::$variant),+];

            /// Region identifier as used in endpoints and signatures.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Region::$variant => $name,)+
                }
            }
        }

        impl FromStr for Region {
            type Err = AwsError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(Region::$variant),)+
                    other => Err(AwsError::validation(format!(
                        "'{}' is not a supported region",
                        other
                    ))),
                }
            }
        }
    };
}

regions! {
    UsEast2 => "us-east-2",
    UsEast1 => "us-east-1",
    UsWest1 => "us-west-1",
    UsWest2 => "us-west-2",
    AfSouth1 => "af-south-1",
    ApEast1 => "ap-east-1",
    ApSouth2 => "ap-south-2",
    ApSoutheast3 => "ap-southeast-3",
    ApSoutheast4 => "ap-southeast-4",
    ApSouth1 => "ap-south-1",
    ApNortheast3 => "ap-northeast-3",
    ApNortheast2 => "ap-northeast-2",
    ApSoutheast1 => "ap-southeast-1",
    ApSoutheast2 => "ap-southeast-2",
    ApNortheast1 => "ap-northeast-1",
    CaCentral1 => "ca-central-1",
    EuCentral1 => "eu-central-1",
    EuWest1 => "eu-west-1",
    EuWest2 => "eu-west-2",
    EuSouth1 => "eu-south-1",
    EuWest3 => "eu-west-3",
    EuSouth2 => "eu-south-2",
    EuNorth1 => "eu-north-1",
    EuCentral2 => "eu-central-2",
    IlCentral1 => "il-central-1",
    MeSouth1 => "me-south-1",
    MeCentral1 => "me-central-1",
    SaEast1 => "sa-east-1",
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
