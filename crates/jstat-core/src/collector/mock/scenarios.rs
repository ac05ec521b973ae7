//! Pre-built `jstat` outputs for testing.
//!
//! Captured from a JDK 8 HotSpot VM running the parallel collector.

use super::runner::MockRunner;
use crate::collector::jstat::ReportMode;

pub const GCCAPACITY: &str = "\
 NGCMN    NGCMX     NGC     S0C   S1C       EC      OGCMN      OGCMX       OGC         OC       MCMN     MCMX      MC     CCSMN    CCSMX     CCSC    YGC    FGC 
 43520.0 697856.0  43520.0 1536.0 1536.0  40448.0    87552.0  1395712.0    87552.0    87552.0      0.0 1056768.0   4864.0      0.0 1048576.0    512.0      5     2
";

pub const GCOLD: &str = "\
   MC       MU      CCSC     CCSU       OC          OU       YGC    FGC    FGCT     GCT   
  4864.0   4283.5    512.0    457.4     87552.0      9182.3      5     2    0.041    0.083
";

pub const GCNEW: &str = "\
 S0C    S1C    S0U    S1U   TT MTT  DSS      EC       EU     YGC     YGCT  
1536.0 1536.0    0.0  992.1  7  15 1536.0  40448.0  21030.6      5    0.042
";

pub const GC: &str = "\
 S0C    S1C    S0U    S1U      EC       EU        OC         OU       MC     MU    CCSC   CCSU   YGC     YGCT    FGC    FGCT     GCT   
1536.0 1536.0  0.0   992.1  40448.0  21030.6   87552.0     9182.3   4864.0 4283.5 512.0  457.4      5    0.042   2      0.041    0.083
";

impl MockRunner {
    /// A healthy VM answering every report mode.
    pub fn typical_jvm() -> Self {
        let mut runner = Self::new();
        runner.add_output(ReportMode::Capacity, GCCAPACITY);
        runner.add_output(ReportMode::Old, GCOLD);
        runner.add_output(ReportMode::New, GCNEW);
        runner.add_output(ReportMode::Summary, GC);
        runner
    }

    /// The target VM exited: every invocation fails the way `jstat` reports it.
    pub fn vm_gone() -> Self {
        let mut runner = Self::new();
        for mode in ReportMode::ALL {
            runner.add_failure(mode, "exit status: 1: 4242 not found");
        }
        runner
    }
}
