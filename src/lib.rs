pub mod configuration;
pub mod configurationerror;

pub mod numbers {
    pub mod arithmeticerror;
    pub mod rational;
    pub mod rationalrecord;
}

pub mod curve {
    pub mod curve;
    pub mod curveerror;
    pub mod curveshape;
    pub mod curvealgebra;
    pub mod curveconvolution;
    pub mod curveclosure;
    pub mod curveproperties;
    pub mod periodicity;
    pub mod propertycache;
    pub mod interval;

    pub mod element {
        pub mod point;
        pub mod segment;
        pub mod element;
        pub mod elementconvolution;
    }

    pub mod sequence {
        pub mod sequence;
        pub mod envelope;
        pub mod sequencealgebra;
        pub mod sequenceconvolution;
        pub mod sequenceclosure;
    }

    pub mod shapes {
        pub mod constantcurve;
        pub mod delayservicecurve;
        pub mod ratelatencyservicecurve;
        pub mod sigmarhoarrivalcurve;
        pub mod staircasecurve;
    }
}
